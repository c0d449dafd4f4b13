//! Scoped mail session and the public attachment operations.

use std::path::Path;

use crate::config::MailConfig;
use crate::locator::{self, Attachment, Scope};
use crate::materializer::{OverwritePolicy, write_attachments};
use crate::matcher::MatchTarget;
use crate::query::AttachmentQuery;
use crate::transport::{ImapTransport, MailTransport, TransportError};
use crate::{Error, Result};

/// An authenticated connection to one mailbox.
///
/// Commands run one at a time; use one session per task. Call
/// [`MailSession::close`] when done, or use [`MailSession::scoped`] /
/// [`with_session`] which always do. A session dropped while still open
/// releases its connection without logging out.
pub struct MailSession<T: MailTransport = ImapTransport> {
    transport: Option<T>,
    host: String,
    default_folder: String,
    overwrite: OverwritePolicy,
    selected: Option<String>,
}

impl MailSession<ImapTransport> {
    /// Connects to the configured server and logs in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connectivity`] if the server cannot be reached and
    /// [`Error::Authentication`] if the login is rejected. In the latter case
    /// LOGOUT is still sent before the connection is released.
    pub async fn open(config: &MailConfig) -> Result<Self> {
        tracing::info!(host = %config.host, port = config.port(), "Connecting");
        let transport = ImapTransport::connect(&config.imap_config())
            .await
            .map_err(Error::Connectivity)?;
        Self::open_with(transport, config).await
    }
}

impl<T: MailTransport> MailSession<T> {
    /// Logs in over an already connected transport.
    ///
    /// # Errors
    ///
    /// See [`MailSession::open`].
    pub async fn open_with(mut transport: T, config: &MailConfig) -> Result<Self> {
        if let Err(err) = transport.login(&config.username, &config.password).await {
            tracing::info!(host = %config.host, error = %err, "Login failed");
            if let Err(logout_err) = transport.logout().await {
                tracing::warn!(error = %logout_err, "Logout after failed login failed");
            }
            return Err(login_error(err));
        }

        tracing::info!(host = %config.host, "Session opened");
        Ok(Self {
            transport: Some(transport),
            host: config.host.clone(),
            default_folder: config.mail_folder.clone(),
            overwrite: config.overwrite,
            selected: None,
        })
    }

    /// Opens a session, runs `f` on it and closes it, on success and on error.
    ///
    /// If `f` panics, or the returned future is dropped before it completes,
    /// LOGOUT is never sent: the session's `Drop` releases the connection
    /// without it and logs a warning.
    ///
    /// ```no_run
    /// # async fn demo() -> mailsift::Result<()> {
    /// use mailsift::{ImapTransport, MailConfig, MailSession};
    ///
    /// let config = MailConfig::new("imap.example.com", "me", "secret");
    /// let transport = ImapTransport::connect(&config.imap_config())
    ///     .await
    ///     .map_err(mailsift::Error::Connectivity)?;
    /// let found = MailSession::scoped(transport, &config, async |session| {
    ///     session.has_mail_attachments("test1.csv", "INBOX", false).await
    /// })
    /// .await?;
    /// # let _ = found;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the error from opening the session, or whatever `f` returns.
    /// Close failures are logged, never returned.
    pub async fn scoped<F, R>(transport: T, config: &MailConfig, f: F) -> Result<R>
    where
        F: AsyncFnOnce(&mut Self) -> Result<R>,
    {
        let mut session = Self::open_with(transport, config).await?;
        let result = f(&mut session).await;
        session.close().await;
        result
    }

    /// Whether the session still holds its connection.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// The folder opened by the last lookup, if any.
    #[must_use]
    pub fn selected_folder(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The folder used when a query names none.
    #[must_use]
    pub fn default_folder(&self) -> &str {
        &self.default_folder
    }

    /// The policy used by downloads.
    #[must_use]
    pub const fn overwrite_policy(&self) -> OverwritePolicy {
        self.overwrite
    }

    /// Changes the policy used by downloads.
    pub const fn set_overwrite_policy(&mut self, policy: OverwritePolicy) {
        self.overwrite = policy;
    }

    /// Leaves the open folder, logs out and releases the connection.
    ///
    /// Failures are logged and swallowed; the connection is released either
    /// way. Calling this again does nothing.
    pub async fn close(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };

        if let Some(folder) = self.selected.take()
            && let Err(err) = transport.close_mailbox().await
        {
            tracing::warn!(folder, error = %err, "Closing folder failed");
        }
        if let Err(err) = transport.logout().await {
            tracing::warn!(host = %self.host, error = %err, "Logout failed");
        }
        tracing::info!(host = %self.host, "Session closed");
    }

    /// Whether any message in `mail_folder` has a matching attachment.
    ///
    /// Only filenames are compared; payloads are never decoded. Stops
    /// fetching at the first match.
    ///
    /// # Errors
    ///
    /// As for [`MailSession::retrieve_mail_attachments`], except that
    /// [`Error::Decode`] cannot occur.
    pub async fn has_mail_attachments(
        &mut self,
        name: &str,
        mail_folder: &str,
        check_regex: bool,
    ) -> Result<bool> {
        let target = MatchTarget::from_flag(name, check_regex)?;
        self.check(mail_folder, &target).await
    }

    /// Every matching attachment in `mail_folder`, oldest message first.
    ///
    /// With `check_regex` the name is a regular expression matched anywhere
    /// in the filename; otherwise filenames must equal it exactly.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPattern`], [`Error::Folder`], [`Error::Search`],
    /// [`Error::Fetch`], [`Error::Decode`], or [`Error::SessionClosed`].
    pub async fn retrieve_mail_attachments(
        &mut self,
        name: &str,
        mail_folder: &str,
        check_regex: bool,
    ) -> Result<Vec<Attachment>> {
        let target = MatchTarget::from_flag(name, check_regex)?;
        self.locate(mail_folder, &target).await
    }

    /// Writes every matching attachment into `local_output_directory`.
    ///
    /// Returns the file names written, in order. Existing files are handled
    /// per the session's [`OverwritePolicy`].
    ///
    /// # Errors
    ///
    /// As for [`MailSession::retrieve_mail_attachments`], plus
    /// [`Error::Write`] on the first file that cannot be written.
    pub async fn download_mail_attachments(
        &mut self,
        name: &str,
        local_output_directory: impl AsRef<Path>,
        mail_folder: &str,
        check_regex: bool,
    ) -> Result<Vec<String>> {
        let found = self
            .retrieve_mail_attachments(name, mail_folder, check_regex)
            .await?;
        self.materialize(local_output_directory.as_ref(), &found)
            .await
    }

    /// Every attachment in `folder` whose filename satisfies `target`.
    ///
    /// # Errors
    ///
    /// As for [`MailSession::retrieve_mail_attachments`].
    pub async fn locate(&mut self, folder: &str, target: &MatchTarget) -> Result<Vec<Attachment>> {
        self.run(folder, target, Scope::All).await
    }

    /// [`MailSession::has_mail_attachments`] for a query.
    ///
    /// # Errors
    ///
    /// As for [`MailSession::retrieve_mail_attachments`].
    pub async fn has_attachments(&mut self, query: &AttachmentQuery) -> Result<bool> {
        let target = query.target()?;
        let folder = self.folder_for(query);
        self.check(&folder, &target).await
    }

    /// [`MailSession::retrieve_mail_attachments`] for a query.
    ///
    /// # Errors
    ///
    /// As for [`MailSession::retrieve_mail_attachments`].
    pub async fn retrieve(&mut self, query: &AttachmentQuery) -> Result<Vec<Attachment>> {
        let target = query.target()?;
        let folder = self.folder_for(query);
        let scope = if query.is_latest_only() {
            Scope::Latest
        } else {
            Scope::All
        };
        self.run(&folder, &target, scope).await
    }

    /// [`MailSession::download_mail_attachments`] for a query.
    ///
    /// # Errors
    ///
    /// As for [`MailSession::download_mail_attachments`].
    pub async fn download(
        &mut self,
        query: &AttachmentQuery,
        local_output_directory: impl AsRef<Path>,
    ) -> Result<Vec<String>> {
        let found = self.retrieve(query).await?;
        self.materialize(local_output_directory.as_ref(), &found)
            .await
    }

    fn folder_for(&self, query: &AttachmentQuery) -> String {
        query
            .mail_folder()
            .unwrap_or(&self.default_folder)
            .to_string()
    }

    async fn run(
        &mut self,
        folder: &str,
        target: &MatchTarget,
        scope: Scope,
    ) -> Result<Vec<Attachment>> {
        let transport = self.transport.as_mut().ok_or(Error::SessionClosed)?;
        let result = locator::locate(transport, folder, target, scope).await;

        self.note_selection(folder, &result);
        if let Ok(found) = &result {
            tracing::info!(folder, %target, matches = found.len(), "Attachment lookup finished");
        }
        result
    }

    async fn check(&mut self, folder: &str, target: &MatchTarget) -> Result<bool> {
        let transport = self.transport.as_mut().ok_or(Error::SessionClosed)?;
        let result = locator::contains(transport, folder, target).await;

        self.note_selection(folder, &result);
        if let Ok(found) = &result {
            tracing::info!(folder, %target, found, "Attachment presence check finished");
        }
        result
    }

    fn note_selection<R>(&mut self, folder: &str, result: &Result<R>) {
        self.selected = match result {
            Err(Error::Folder { .. }) => None,
            _ => Some(folder.to_string()),
        };
    }

    async fn materialize(&self, dir: &Path, found: &[Attachment]) -> Result<Vec<String>> {
        let written = write_attachments(dir, found, self.overwrite).await?;
        tracing::info!(dir = %dir.display(), files = written.len(), "Attachments written");
        Ok(written)
    }
}

/// Connects, runs `f` on the session and closes it, on success and on error.
///
/// A panic in `f` or a cancelled future skips LOGOUT, as with
/// [`MailSession::scoped`].
///
/// # Errors
///
/// Returns the error from opening the session, or whatever `f` returns.
pub async fn with_session<F, R>(config: &MailConfig, f: F) -> Result<R>
where
    F: AsyncFnOnce(&mut MailSession) -> Result<R>,
{
    let mut session = MailSession::open(config).await?;
    let result = f(&mut session).await;
    session.close().await;
    result
}

/// Maps a failed LOGIN onto the error taxonomy.
fn login_error(err: TransportError) -> Error {
    match err {
        TransportError::Io(_) | TransportError::Tls(_) | TransportError::Timeout(_) => {
            Error::Connectivity(err)
        }
        _ => Error::Authentication(err),
    }
}

impl<T: MailTransport> Drop for MailSession<T> {
    fn drop(&mut self) {
        if self.transport.take().is_some() {
            tracing::warn!(
                host = %self.host,
                "Session dropped while open; connection released without LOGOUT"
            );
        }
    }
}

impl<T: MailTransport> std::fmt::Debug for MailSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSession")
            .field("host", &self.host)
            .field("open", &self.is_open())
            .field("selected", &self.selected)
            .field("overwrite", &self.overwrite)
            .finish_non_exhaustive()
    }
}
