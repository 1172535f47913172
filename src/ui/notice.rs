//! Modal alert for user-visible notices.

use libadwaita::{
    AlertDialog,
    gtk::Widget,
    prelude::{AdwDialogExt, AlertDialogExt, IsA},
};

use crate::error::Notice;

/// Builds the alert dialog for `notice` with a single "OK" response.
#[must_use]
pub fn notice_dialog(notice: &Notice) -> AlertDialog {
    let dialog = AlertDialog::new(Some(&notice.title), Some(&notice.message));
    dialog.add_response("ok", "OK");
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog
}

/// Shows `notice` over `parent`.
pub fn present_notice(parent: &impl IsA<Widget>, notice: &Notice) {
    notice_dialog(notice).present(Some(parent));
}
