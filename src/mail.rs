use crate::domain::language::Language;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscription_token::SubscriptionToken;
use crate::email_client::EmailClient;

/// Composes the site's outgoing messages and hands them to the [`EmailClient`].
///
/// Every send reports success as a `bool`: delivery problems are logged here and never
/// bubble up, callers only count them.
pub struct Mailer {
    email_client: EmailClient,
    base_url: String,
    brand: String,
}

impl Mailer {
    pub fn new(email_client: EmailClient, base_url: String, brand: String) -> Mailer {
        Mailer {
            email_client,
            base_url,
            brand,
        }
    }

    pub fn confirmation_link(&self, confirm_token: &SubscriptionToken) -> String {
        format!(
            "{}/subscriptions/confirm?token={}",
            self.base_url, confirm_token
        )
    }

    pub fn unsubscribe_link(&self, unsubscribe_token: &SubscriptionToken) -> String {
        format!("{}/unsubscribe?token={}", self.base_url, unsubscribe_token)
    }

    #[tracing::instrument(
        name = "Send a confirmation email",
        skip(self, confirm_token),
        fields(recipient = %email, language = %language.as_ref())
    )]
    pub async fn send_confirmation(
        &self,
        email: &SubscriberEmail,
        confirm_token: &SubscriptionToken,
        language: Language,
    ) -> bool {
        let confirmation_link = self.confirmation_link(confirm_token);
        let (subject, heading, intro, button, ignore, text) = match language {
            Language::Nl => (
                format!("Bevestig je aanmelding - {}", self.brand),
                "Bevestig je aanmelding",
                "Bedankt voor je interesse! Klik op de onderstaande knop om je aanmelding voor onze mailinglijst te bevestigen.",
                "Bevestig aanmelding",
                "Als je je niet hebt aangemeld, kun je deze email negeren.",
                format!(
                    "Bevestig je aanmelding voor de {} mailinglijst: {}",
                    self.brand, confirmation_link
                ),
            ),
            Language::En => (
                format!("Confirm your subscription - {}", self.brand),
                "Confirm your subscription",
                "Thanks for your interest! Click the button below to confirm your subscription to our mailing list.",
                "Confirm subscription",
                "If you didn't sign up, you can safely ignore this email.",
                format!(
                    "Confirm your subscription to the {} mailing list: {}",
                    self.brand, confirmation_link
                ),
            ),
        };
        let html = self.layout(&format!(
            r#"<h2>{heading}</h2>
            <p>{intro}</p>
            <p><a href="{confirmation_link}" style="display:inline-block;background:#f0e51b;color:#000;padding:0.7rem 1.5rem;border-radius:6px;font-weight:600;text-decoration:none;">{button}</a></p>
            <p style="color:#717171;font-size:0.85rem;">{ignore}</p>"#
        ));

        self.deliver(email, &subject, &html, Some(&text)).await
    }

    #[tracing::instrument(
        name = "Send a newsletter email",
        skip(self, subject, body_html, unsubscribe_token),
        fields(recipient = %email, language = %language.as_ref())
    )]
    pub async fn send_newsletter(
        &self,
        email: &SubscriberEmail,
        subject: &str,
        body_html: &str,
        unsubscribe_token: &SubscriptionToken,
        language: Language,
    ) -> bool {
        let unsubscribe_link = self.unsubscribe_link(unsubscribe_token);
        let html = self.render_newsletter(body_html, &unsubscribe_link, language);

        self.deliver(email, subject, &html, None).await
    }

    /// Newsletter body wrapped in the site layout with a personal unsubscribe footer.
    pub fn render_newsletter(
        &self,
        body_html: &str,
        unsubscribe_link: &str,
        language: Language,
    ) -> String {
        let unsubscribe_label = match language {
            Language::Nl => "Afmelden",
            Language::En => "Unsubscribe",
        };

        self.layout(&format!(
            r#"{body_html}
            <p style="margin-top:2.5rem;color:#717171;font-size:0.8rem;"><a href="{unsubscribe_link}" style="color:#717171;">{unsubscribe_label}</a></p>"#
        ))
    }

    fn layout(&self, inner: &str) -> String {
        format!(
            r#"<div style="font-family:'Helvetica Neue',Arial,sans-serif;max-width:560px;margin:0 auto;padding:2rem;">
            <div style="border-bottom:3px solid #f0e51b;padding-bottom:1rem;margin-bottom:1.5rem;"><strong>{brand}</strong></div>
            {inner}
            <div style="margin-top:2rem;padding-top:1rem;border-top:1px solid #e5e5e5;color:#717171;font-size:0.8rem;">{brand} &middot; Amsterdam</div>
            </div>"#,
            brand = self.brand,
        )
    }

    async fn deliver(
        &self,
        email: &SubscriberEmail,
        subject: &str,
        html: &str,
        text: Option<&str>,
    ) -> bool {
        match self.email_client.send_email(email, subject, html, text).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("Failed to send an email to {}: {:?}", email, err);
                false
            }
        }
    }
}
