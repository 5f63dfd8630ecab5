use crate::error::AppError;
use crate::notify::{Notifier, launch_show, parse_activation_argument};
use crate::reminders::ReminderRequest;
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, request: &ReminderRequest) -> Result<(), AppError> {
        self.notify_with_action(request, "")
    }

    fn notify_with_action(&self, request: &ReminderRequest, action: &str) -> Result<(), AppError> {
        let task_id = request.task_id.clone();
        let action_value = action.to_string();
        let mut toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title("upkeep")
            .text1(&request.title)
            .text2(&request.body);

        if !action_value.trim().is_empty() {
            toast = toast.add_button("Open", &action_value);
        }

        toast
            .on_activated(move |args| {
                let target = args
                    .as_deref()
                    .and_then(parse_activation_argument)
                    .unwrap_or_else(|| task_id.clone());
                let _ = launch_show(&target);
                Ok(())
            })
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
