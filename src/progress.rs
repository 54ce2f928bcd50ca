//! Live progress dialogs
//!
//! `kdialog --progressbar` returns immediately, printing the D-Bus address of
//! the window it opened. The window is then driven through the
//! `org.kde.kdialog.ProgressDialog` interface on the session bus.

use std::fmt;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};
use zbus::{Connection, Proxy};

use crate::error::{DialogError, Result};

const PROGRESS_INTERFACE: &str = "org.kde.kdialog.ProgressDialog";

/// A progress window the caller can update until it closes it
pub trait ProgressHandle: fmt::Debug {
    fn value(&self) -> u32;

    fn maximum(&self) -> u32;

    fn label(&self) -> &str;

    /// Move the bar; values above the maximum are clamped
    fn set_value(&mut self, value: u32) -> Result<()>;

    fn set_label(&mut self, label: &str) -> Result<()>;

    /// Whether the user pressed the dialog's Cancel button
    fn was_cancelled(&self) -> Result<bool>;

    /// Close the window. Closing twice is fine.
    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;

    fn advance(&mut self, by: u32) -> Result<()> {
        let next = self.value().saturating_add(by);
        self.set_value(next)
    }
}

/// The remote calls a progress window understands
pub trait ProgressBus: fmt::Debug {
    fn set_maximum(&self, maximum: i32) -> Result<()>;
    fn set_value(&self, value: i32) -> Result<()>;
    fn set_label(&self, label: &str) -> Result<()>;
    fn show_cancel_button(&self, show: bool) -> Result<()>;
    fn was_cancelled(&self) -> Result<bool>;
    fn close(&self) -> Result<()>;
}

impl<B: ProgressBus + ?Sized> ProgressBus for Box<B> {
    fn set_maximum(&self, maximum: i32) -> Result<()> {
        (**self).set_maximum(maximum)
    }
    fn set_value(&self, value: i32) -> Result<()> {
        (**self).set_value(value)
    }
    fn set_label(&self, label: &str) -> Result<()> {
        (**self).set_label(label)
    }
    fn show_cancel_button(&self, show: bool) -> Result<()> {
        (**self).show_cancel_button(show)
    }
    fn was_cancelled(&self) -> Result<bool> {
        (**self).was_cancelled()
    }
    fn close(&self) -> Result<()> {
        (**self).close()
    }
}

/// Reaches the window `kdialog --progressbar` announced
pub trait ProgressConnector: Send + Sync + fmt::Debug {
    fn connect(&self, service: &str, path: &str) -> Result<Box<dyn ProgressBus>>;
}

/// Connects through the session bus
#[derive(Debug, Default, Clone, Copy)]
pub struct DbusConnector;

impl ProgressConnector for DbusConnector {
    fn connect(&self, service: &str, path: &str) -> Result<Box<dyn ProgressBus>> {
        Ok(Box::new(DbusProgressBus::connect(service, path)?))
    }
}

/// [`ProgressBus`] over the D-Bus session bus
pub struct DbusProgressBus {
    // Declared before the runtime so it drops first
    proxy: Proxy<'static>,
    runtime: Runtime,
}

impl fmt::Debug for DbusProgressBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbusProgressBus")
            .field("destination", &self.proxy.destination().to_string())
            .field("path", &self.proxy.path().to_string())
            .finish()
    }
}

impl DbusProgressBus {
    pub fn connect(service: &str, path: &str) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .worker_threads(1)
            .thread_name("dialog-shim-dbus")
            .build()?;

        let (service, path) = (service.to_string(), path.to_string());
        let proxy = runtime.block_on(async move {
            let connection = Connection::session().await?;
            Proxy::new(&connection, service, path, PROGRESS_INTERFACE).await
        })?;
        debug!("Connected to {} on the session bus", proxy.destination());

        Ok(Self { proxy, runtime })
    }

    fn call_void<B>(&self, method: &'static str, body: &B) -> Result<()>
    where
        B: serde::Serialize + zbus::zvariant::DynamicType,
    {
        self.runtime.block_on(self.proxy.call_method(method, body))?;
        Ok(())
    }
}

impl ProgressBus for DbusProgressBus {
    fn set_maximum(&self, maximum: i32) -> Result<()> {
        self.runtime.block_on(self.proxy.set_property("maximum", maximum))?;
        Ok(())
    }

    fn set_value(&self, value: i32) -> Result<()> {
        self.runtime.block_on(self.proxy.set_property("value", value))?;
        Ok(())
    }

    fn set_label(&self, label: &str) -> Result<()> {
        self.call_void("setLabelText", &(label,))
    }

    fn show_cancel_button(&self, show: bool) -> Result<()> {
        self.call_void("showCancelButton", &(show,))
    }

    fn was_cancelled(&self) -> Result<bool> {
        let cancelled: bool = self.runtime.block_on(self.proxy.call("wasCancelled", &()))?;
        Ok(cancelled)
    }

    fn close(&self) -> Result<()> {
        self.call_void("close", &())
    }
}

/// A kdialog progress window. Closed on [`ProgressHandle::close`] or drop.
#[derive(Debug)]
pub struct KdeProgress<B: ProgressBus> {
    bus: Option<B>,
    value: u32,
    maximum: u32,
    label: String,
}

impl<B: ProgressBus> KdeProgress<B> {
    /// Take over a freshly opened window. If setting it up fails the
    /// window is closed again.
    pub fn start(bus: B, label: &str, maximum: u32, cancellable: bool) -> Result<Self> {
        let progress = Self {
            bus: Some(bus),
            value: 0,
            maximum,
            label: label.to_string(),
        };
        let bus = progress.bus()?;
        bus.set_maximum(to_bus(maximum))?;
        bus.show_cancel_button(cancellable)?;
        Ok(progress)
    }

    fn bus(&self) -> Result<&B> {
        self.bus.as_ref().ok_or(DialogError::ProgressClosed)
    }
}

fn to_bus(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl<B: ProgressBus> ProgressHandle for KdeProgress<B> {
    fn value(&self) -> u32 {
        self.value
    }

    fn maximum(&self) -> u32 {
        self.maximum
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn set_value(&mut self, value: u32) -> Result<()> {
        let value = value.min(self.maximum);
        self.bus()?.set_value(to_bus(value))?;
        self.value = value;
        Ok(())
    }

    fn set_label(&mut self, label: &str) -> Result<()> {
        self.bus()?.set_label(label)?;
        self.label = label.to_string();
        Ok(())
    }

    fn was_cancelled(&self) -> Result<bool> {
        self.bus()?.was_cancelled()
    }

    fn close(&mut self) -> Result<()> {
        match self.bus.take() {
            Some(bus) => bus.close(),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.bus.is_none()
    }
}

impl<B: ProgressBus> Drop for KdeProgress<B> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close progress dialog: {}", e);
        }
    }
}
