pub mod audience;
pub mod language;
pub mod new_subscriber;
pub mod newsletter;
pub mod subscriber;
pub mod subscriber_email;
pub mod subscriber_name;
pub mod subscriber_status;
pub mod subscription_token;
pub mod waitlist;
