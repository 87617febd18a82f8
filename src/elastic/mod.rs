use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking;
use reqwest::blocking::multipart;
use serde::Deserialize;

pub mod api;

use crate::email::{Email, Recipients};
use crate::storage::{self, Storage};
use crate::{Error, Mailer};

/// Elastic Email API credentials. Always passed in explicitly; the
/// transport never reads them from the process environment.
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub account: String,
}

/// Transport construction options.
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Override the provider's fixed send endpoint (used by tests).
    pub endpoint: Option<String>,

    /// Skip TLS certificate verification. Off by default; enabling it
    /// is a known weakness and is logged as a warning.
    pub danger_accept_invalid_certs: bool,
}

/// A single attachment staged on disk for the duration of one
/// submission, referenced by a multipart file field.
#[derive(Debug)]
pub struct StagedFile {
    /// Multipart field name (`file_<i>`).
    pub field: String,

    /// Staging name within the storage area, used for cleanup.
    pub name: String,

    /// Absolute path of the staged file.
    pub path: PathBuf,

    /// Declared content type of the original attachment.
    pub content_type: String,

    /// Original filename, reported as the upload's filename.
    pub file_name: String,
}

/// Inspectable intermediate form of the outgoing request: all scalar
/// fields plus one file field per staged attachment.
#[derive(Debug, Default)]
pub struct Payload {
    pub fields: Vec<(&'static str, String)>,
    pub files: Vec<StagedFile>,
}

impl Payload {
    fn into_form(self) -> Result<multipart::Form, Error> {
        let mut form = multipart::Form::new();

        for (name, value) in self.fields {
            form = form.text(name, value);
        }

        for file in self.files {
            let part = multipart::Part::file(&file.path)?
                .file_name(file.file_name)
                .mime_str(&file.content_type)?;
            form = form.part(file.field, part);
        }

        Ok(form)
    }
}

type BeforeSend = Box<dyn Fn(&mut Email) + Send + Sync>;

/// Transport for the Elastic Email v2 send endpoint.
///
/// One call to [`submit`](Transport::submit) maps a prepared [`Email`]
/// onto the provider's multipart form, stages attachments as temp
/// files, performs a single blocking POST and returns the raw response
/// body. Staged files never outlive the call.
pub struct Transport {
    creds: Credentials,
    storage: Storage,
    endpoint: String,
    client: blocking::Client,
    before_send: Option<BeforeSend>,
}

impl Transport {
    pub fn new(creds: Credentials, storage: Storage) -> Result<Self, Error> {
        Self::with_options(creds, storage, Options::default())
    }

    pub fn with_options(
        creds: Credentials,
        storage: Storage,
        options: Options,
    ) -> Result<Self, Error> {
        if options.danger_accept_invalid_certs {
            log::warn!("TLS certificate verification is disabled");
        }

        let client = blocking::Client::builder()
            .timeout(Duration::from_secs(api::ELASTIC_REQUEST_TIMEOUT))
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(options.danger_accept_invalid_certs)
            .build()?;

        let endpoint = options
            .endpoint
            .unwrap_or_else(|| api::build_endpoint_url(api::Endpoint::EmailSend));

        Ok(Self {
            creds,
            storage,
            endpoint,
            client,
            before_send: None,
        })
    }

    pub fn from_config(config: &crate::config::Config) -> Result<Self, Error> {
        let creds = Credentials {
            api_key: config.api_key.clone(),
            account: config.account.clone(),
        };

        let options = Options {
            endpoint: config.endpoint.clone(),
            danger_accept_invalid_certs: !config.verify_tls,
        };

        Self::with_options(creds, Storage::new(&config.storage_root), options)
    }

    /// Register a hook that runs exactly once per submission, before
    /// any field extraction. Callers use this to adjust the message in
    /// place (e.g. stamp a subject or extra recipient).
    pub fn before_send<F>(&mut self, hook: F)
    where
        F: Fn(&mut Email) + Send + Sync + 'static,
    {
        self.before_send = Some(Box::new(hook));
    }

    /// Submit one message and return the provider's raw response body.
    ///
    /// The body comes back verbatim whatever the HTTP status; callers
    /// interpret success or failure from it themselves.
    pub fn submit(&self, email: &mut Email) -> Result<String, Error> {
        if let Some(hook) = &self.before_send {
            hook(email);
        }

        let mut payload = self.build_fields(email);
        let staged = self.stage_attachments(email, &mut payload);

        // Names of everything that made it to disk, for cleanup
        let staged_names: Vec<String> = payload.files.iter().map(|f| f.name.clone()).collect();

        let result = match staged {
            Ok(()) => self.send(payload),
            // No partial request goes out if staging failed
            Err(e) => Err(e),
        };

        if !staged_names.is_empty() {
            self.cleanup(&staged_names);
        }

        result
    }

    /// Map the message onto the endpoint's scalar fields. Every field
    /// is always present; several may be empty strings.
    fn build_fields(&self, email: &Email) -> Payload {
        let sender = email.sender().cloned().unwrap_or_default();

        let to = join_addresses(email.recipients(Recipients::To));
        let cc = join_addresses(email.recipients(Recipients::Cc));
        let bcc = join_addresses(email.recipients(Recipients::Bcc));

        Payload {
            fields: vec![
                (api::FIELD_API_KEY, self.creds.api_key.clone()),
                (api::FIELD_ACCOUNT, self.creds.account.clone()),
                (api::FIELD_MSG_TO, to.clone()),
                (api::FIELD_MSG_CC, cc),
                (api::FIELD_MSG_BCC, bcc),
                (api::FIELD_MSG_FROM, sender.address.clone()),
                (api::FIELD_MSG_FROM_NAME, sender.name.clone()),
                (api::FIELD_FROM, sender.address),
                (api::FIELD_FROM_NAME, sender.name),
                (api::FIELD_TO, to),
                (api::FIELD_SUBJECT, email.subject.clone()),
                (api::FIELD_BODY_HTML, email.body_html.clone()),
                (api::FIELD_BODY_TEXT, email.text_body().unwrap_or_default()),
            ],
            files: Vec::new(),
        }
    }

    /// Stage genuine attachments in original order as `file_1..file_N`.
    /// Inline and alternative parts are never staged. Any write error
    /// aborts the submission before the network call.
    fn stage_attachments(&self, email: &Email, payload: &mut Payload) -> Result<(), Error> {
        for (i, part) in email.attachments().enumerate() {
            let name = storage::unique_name(&part.name);
            let path = self.storage.put(&name, &part.data)?;

            log::debug!("Staged attachment {} as {}", part.name, name);

            payload.files.push(StagedFile {
                field: api::file_field(i + 1),
                name,
                path,
                content_type: part.content_type.clone(),
                file_name: part.name.clone(),
            });
        }

        Ok(())
    }

    fn send(&self, payload: Payload) -> Result<String, Error> {
        let form = payload.into_form()?;
        let url = reqwest::Url::parse(&self.endpoint)?;

        let resp = self.client.post(url).multipart(form).send()?;

        // Raw body, no status interpretation
        Ok(resp.text()?)
    }

    /// Delete every staged file. A file that already went missing is
    /// skipped silently; a failed delete never masks the send result.
    fn cleanup(&self, names: &[String]) {
        for name in names {
            if !self.storage.exists(name) {
                continue;
            }

            if let Err(e) = self.storage.delete(name) {
                log::warn!("Failed to delete staged attachment {}: {}", name, e);
            }
        }
    }
}

impl Mailer for Transport {
    fn submit(&self, email: &mut Email) -> Result<String, Error> {
        Transport::submit(self, email)
    }
}

fn join_addresses(mailboxes: &[crate::email::Mailbox]) -> String {
    mailboxes
        .iter()
        .map(|m| m.address.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
