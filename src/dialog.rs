//! Blocking message pop-ups for confirmation and notification.
//!
//! Available with the `dialogs` cargo feature. Both helpers open a modal
//! dialog and block the calling thread until the user responds; there is no
//! timeout.

use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

/// Show a warning that can be accepted or dismissed.
///
/// Returns `true` iff the user accepted.
pub fn confirm(title: &str, message: &str) -> bool {
    let result = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::OkCancel)
        .show();
    matches!(result, MessageDialogResult::Ok)
}

/// Show information that can only be acknowledged.
pub fn notify(title: &str, message: &str) {
    let _ = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}
