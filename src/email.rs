use serde::{Deserialize, Serialize};

/// Generic Email, Part and Mailbox implementations.
/// The idea is to keep the message model provider-neutral and let
/// transport types map it onto their own wire formats.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Email {
    /// Sender mailboxes. Only the first entry is ever transmitted;
    /// any additional entries are ignored (first-inserted wins).
    pub from: Vec<Mailbox>,

    pub to: Vec<Mailbox>,
    pub cc: Vec<Mailbox>,
    pub bcc: Vec<Mailbox>,

    pub subject: String,

    /// HTML body. May be empty.
    pub body_html: String,

    /// Additional MIME parts: alternative bodies, inline content and
    /// file attachments, in original message order.
    pub parts: Vec<Part>,
}

/// Recipient header selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipients {
    To,
    Cc,
    Bcc,
}

/// A single (address, display name) pair.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Mailbox {
    pub address: String,
    pub name: String,
}

impl Mailbox {
    pub fn new(address: &str, name: &str) -> Self {
        Self {
            address: address.to_string(),
            name: name.to_string(),
        }
    }
}

/// How a MIME part participates in the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// A genuine file attachment.
    Attachment,
    /// Inline content referenced from the HTML body (e.g. via cid:).
    Inline,
    /// An alternative rendering of the body (e.g. text/plain).
    Alternative,
}

impl Default for Disposition {
    fn default() -> Self {
        Disposition::Alternative
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Part {
    pub disposition: Disposition,

    /// MIME type of the part (e.g., text/plain)
    pub content_type: String,

    /// Filename for attachment parts; may be empty for body parts.
    pub name: String,

    pub data: Vec<u8>,
}

impl Part {
    pub fn attachment(name: &str, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            disposition: Disposition::Attachment,
            content_type: content_type.to_string(),
            name: name.to_string(),
            data,
        }
    }

    pub fn inline(name: &str, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            disposition: Disposition::Inline,
            content_type: content_type.to_string(),
            name: name.to_string(),
            data,
        }
    }

    pub fn text(content_type: &str, body: &str) -> Self {
        Self {
            disposition: Disposition::Alternative,
            content_type: content_type.to_string(),
            name: String::new(),
            data: body.as_bytes().to_vec(),
        }
    }

    /// Capability check used when counting and staging attachments.
    /// Inline and alternative parts are never staged.
    pub fn is_attachment(&self) -> bool {
        self.disposition == Disposition::Attachment
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Inspect a parsed MIME part to determine if it is an attachment
    /// or inline content. Body parts return `None`.
    fn from_mime(part: &mailparse::ParsedMail) -> Option<Part> {
        use mailparse::DispositionType;

        let disposition = part.get_content_disposition();
        let mimetype = &part.ctype.mimetype;

        let kind = match disposition.disposition {
            DispositionType::Attachment => Disposition::Attachment,
            // An inline text part is a body candidate, not an attachment
            DispositionType::Inline if !mimetype.starts_with("text/") => Disposition::Inline,
            _ => return None,
        };

        let name = disposition
            .params
            .get("filename")
            .or_else(|| part.ctype.params.get("name"))
            .cloned()
            .unwrap_or_default();

        let data = match part.get_body_raw() {
            Ok(body) => body,
            Err(_) => {
                log::error!("Attachment body not found");
                return None;
            }
        };

        Some(Part {
            disposition: kind,
            content_type: mimetype.clone(),
            name,
            data,
        })
    }
}

impl Email {
    pub fn new() -> Email {
        Default::default()
    }

    /// The transmitted sender. First entry wins if more than one
    /// mailbox is present.
    pub fn sender(&self) -> Option<&Mailbox> {
        self.from.first()
    }

    pub fn recipients(&self, field: Recipients) -> &[Mailbox] {
        match field {
            Recipients::To => &self.to,
            Recipients::Cc => &self.cc,
            Recipients::Bcc => &self.bcc,
        }
    }

    /// Extract the plain-text body by scanning parts in original order.
    /// The last text/plain part wins.
    pub fn text_body(&self) -> Option<String> {
        let mut text = None;

        for part in &self.parts {
            if part.content_type == "text/plain" {
                text = Some(String::from_utf8_lossy(&part.data).into_owned());
            }
        }

        text
    }

    /// Genuine file attachments, in original order.
    pub fn attachments(&self) -> impl Iterator<Item = &Part> + '_ {
        self.parts.iter().filter(|p| p.is_attachment())
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments().count()
    }

    /// Convert a raw MIME message into structured format.
    pub fn from_mime(mime_content: &[u8]) -> Result<Email, crate::Error> {
        use mailparse::MailHeaderMap;

        let parsed = mailparse::parse_mail(mime_content)?;

        let mut email = Email::new();

        email.subject = parsed.headers.get_first_value("Subject").unwrap_or_default();
        email.from = parse_mailboxes(parsed.headers.get_first_value("From"));
        email.to = parse_mailboxes(parsed.headers.get_first_value("To"));
        email.cc = parse_mailboxes(parsed.headers.get_first_value("Cc"));
        email.bcc = parse_mailboxes(parsed.headers.get_first_value("Bcc"));

        email.parse_recursive(&parsed)?;

        Ok(email)
    }

    /// Recursively walk the MIME parts and extract the following:
    ///
    /// 1. Body (text and/or html)
    /// 2. Inline parts
    /// 3. Regular attachments
    ///
    fn parse_recursive(&mut self, part: &mailparse::ParsedMail) -> Result<(), crate::Error> {
        let mimetype = &part.ctype.mimetype;

        // If this is an attachment or inline part, append and return
        if let Some(part) = Part::from_mime(part) {
            self.parts.push(part);
            return Ok(());
        }

        // Email body
        if mimetype.starts_with("text/") {
            let body = part.get_body()?;

            if mimetype.ends_with("plain") {
                self.parts.push(Part::text("text/plain", &body));
            } else if mimetype.ends_with("html") {
                self.body_html = body;
            }

            return Ok(());
        }

        // Multipart -> process each subpart recursively
        if mimetype.starts_with("multipart/") {
            for subpart in part.subparts.iter() {
                self.parse_recursive(subpart)?;
            }
        }

        Ok(())
    }
}

/// Parse an address header value into mailboxes. Group addresses are
/// flattened; an unparseable header yields no mailboxes.
fn parse_mailboxes(header: Option<String>) -> Vec<Mailbox> {
    let value = match header {
        Some(v) => v,
        None => return Vec::new(),
    };

    let parsed = match mailparse::addrparse(&value) {
        Ok(list) => list,
        Err(e) => {
            log::error!("Failed to parse address header \"{}\": {}", value, e);
            return Vec::new();
        }
    };

    let mut mailboxes = Vec::new();

    for addr in parsed.iter() {
        match addr {
            mailparse::MailAddr::Single(info) => {
                mailboxes.push(Mailbox::new(
                    &info.addr,
                    info.display_name.as_deref().unwrap_or(""),
                ));
            }
            mailparse::MailAddr::Group(group) => {
                for info in &group.addrs {
                    mailboxes.push(Mailbox::new(
                        &info.addr,
                        info.display_name.as_deref().unwrap_or(""),
                    ));
                }
            }
        }
    }

    mailboxes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_body_last_match_wins() {
        let mut email = Email::new();
        email.parts.push(Part::text("text/plain", "A"));
        email.parts.push(Part::text("text/html", "B"));
        email.parts.push(Part::text("text/plain", "C"));

        assert_eq!(email.text_body(), Some("C".to_string()));
    }

    #[test]
    fn test_text_body_absent() {
        let mut email = Email::new();
        email.parts.push(Part::text("text/html", "B"));

        assert_eq!(email.text_body(), None);
    }

    #[test]
    fn test_sender_first_wins() {
        let mut email = Email::new();
        assert!(email.sender().is_none());

        email.from.push(Mailbox::new("a@x.com", "Alice"));
        email.from.push(Mailbox::new("b@x.com", "Bob"));

        let sender = email.sender().unwrap();
        assert_eq!(sender.address, "a@x.com");
        assert_eq!(sender.name, "Alice");
    }

    #[test]
    fn test_recipients_selector() {
        let mut email = Email::new();
        email.to.push(Mailbox::new("to@x.com", ""));
        email.bcc.push(Mailbox::new("bcc@x.com", ""));

        assert_eq!(email.recipients(Recipients::To).len(), 1);
        assert_eq!(email.recipients(Recipients::Cc).len(), 0);
        assert_eq!(email.recipients(Recipients::Bcc)[0].address, "bcc@x.com");
    }

    #[test]
    fn test_attachment_counting_skips_inline_parts() {
        let mut email = Email::new();
        email.parts.push(Part::text("text/plain", "body"));
        email.parts.push(Part::attachment("a.pdf", "application/pdf", vec![1]));
        email.parts.push(Part::inline("logo.png", "image/png", vec![2]));
        email.parts.push(Part::attachment("b.txt", "text/plain", vec![3]));

        assert_eq!(email.attachment_count(), 2);

        let names: Vec<&str> = email.attachments().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.txt"]);
    }

    #[test]
    fn test_from_mime() {
        let raw = concat!(
            "From: Alice <a@x.com>\r\n",
            "To: b@y.com, Carol <c@z.com>\r\n",
            "Cc: d@w.com\r\n",
            "Subject: Hello\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/mixed; boundary=\"outer\"\r\n",
            "\r\n",
            "--outer\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "Plain body\r\n",
            "--outer\r\n",
            "Content-Type: text/html\r\n",
            "\r\n",
            "<b>Html body</b>\r\n",
            "--outer\r\n",
            "Content-Type: application/pdf; name=\"report.pdf\"\r\n",
            "Content-Disposition: attachment; filename=\"report.pdf\"\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "aGVsbG8=\r\n",
            "--outer\r\n",
            "Content-Type: image/png; name=\"logo.png\"\r\n",
            "Content-Disposition: inline\r\n",
            "Content-ID: <logo>\r\n",
            "\r\n",
            "PNG\r\n",
            "--outer--\r\n",
        );

        let email = Email::from_mime(raw.as_bytes()).unwrap();

        assert_eq!(email.subject, "Hello");
        assert_eq!(email.from[0].address, "a@x.com");
        assert_eq!(email.from[0].name, "Alice");
        assert_eq!(email.to.len(), 2);
        assert_eq!(email.to[1].address, "c@z.com");
        assert_eq!(email.cc[0].address, "d@w.com");

        assert!(email.body_html.contains("Html body"));
        assert_eq!(email.text_body().unwrap().trim(), "Plain body");

        assert_eq!(email.attachment_count(), 1);
        let attachment = email.attachments().next().unwrap();
        assert_eq!(attachment.name, "report.pdf");
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(attachment.data, b"hello");

        let inline: Vec<&Part> = email
            .parts
            .iter()
            .filter(|p| p.disposition == Disposition::Inline)
            .collect();
        assert_eq!(inline.len(), 1);
        assert_eq!(inline[0].name, "logo.png");
    }

    #[test]
    fn test_serde_round_trip() {
        let mut email = Email::new();
        email.from.push(Mailbox::new("a@x.com", "Alice"));
        email.subject = "Hi".to_string();
        email.parts.push(Part::attachment("a.bin", "application/octet-stream", vec![0, 1, 2]));

        let encoded = serde_json::to_string(&email).unwrap();
        let decoded: Email = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.from[0].address, "a@x.com");
        assert_eq!(decoded.subject, "Hi");
        assert_eq!(decoded.parts[0].data, vec![0, 1, 2]);
        assert!(decoded.parts[0].is_attachment());
    }
}
