//! User-facing notices: transient toasts and modal dialogs.
//!
//! Every pipeline failure is converted into exactly one notice at the
//! point of occurrence; nothing propagates past the controller.

/// Icon/severity of a transient toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Loading,
    Plain,
}

/// One user-facing notice.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Transient toast for recoverable or expected outcomes.
    Toast { kind: ToastKind, message: String },
    /// Modal requiring explicit dismissal (connectivity failures).
    Modal { title: String, message: String },
    /// Clears a pending loading toast.
    HideLoading,
}

/// Sink for notices. The CLI prints them; tests record them.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Console notifier used by the binary.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Toast { kind, message } => match kind {
                ToastKind::Error => eprintln!("[!] {message}"),
                ToastKind::Loading => println!("... {message}"),
                ToastKind::Success => println!("[✓] {message}"),
                ToastKind::Plain => println!("{message}"),
            },
            Notice::Modal { title, message } => {
                eprintln!("== {title} ==");
                eprintln!("{message}");
            }
            Notice::HideLoading => {}
        }
    }
}
