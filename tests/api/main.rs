mod admin_newsletters;
mod dispatch;
mod language;
