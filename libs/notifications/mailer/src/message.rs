use uuid::Uuid;

/// A single outbound email.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Internal id, used for log correlation
    pub id: String,
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            to: to.into(),
            subject: subject.into(),
            body_text: body_text.into(),
            body_html: None,
        }
    }

    pub fn with_html(mut self, body_html: impl Into<String>) -> Self {
        self.body_html = Some(body_html.into());
        self
    }
}
