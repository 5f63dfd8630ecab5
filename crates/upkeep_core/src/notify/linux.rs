use crate::error::AppError;
use crate::notify::{Notifier, launch_show};
use crate::reminders::ReminderRequest;
use notify_rust::Notification;

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, request: &ReminderRequest) -> Result<(), AppError> {
        self.notify_with_action(request, "")
    }

    fn notify_with_action(&self, request: &ReminderRequest, action: &str) -> Result<(), AppError> {
        let mut notification = Notification::new();
        notification.summary(&request.title);
        notification.appname("upkeep");
        if !request.body.trim().is_empty() {
            notification.body(&request.body);
        }
        if !action.trim().is_empty() {
            notification.action(action, "Open");
        }

        let handle = notification
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        if !action.trim().is_empty() {
            let action_key = action.to_string();
            let task_id = request.task_id.clone();
            std::thread::spawn(move || {
                let _ = handle.wait_for_action(|selected| {
                    if selected == action_key || selected == "default" {
                        let _ = launch_show(&task_id);
                    }
                });
            });
        }

        Ok(())
    }
}
