use live_lobby_client::{ErrorKind, LobbyObserver, MembershipView};
use std::io::Write;

/// Render the membership view as one line per participant
pub fn render_view(view: &MembershipView) -> String {
    if view.is_empty() {
        return "  (nobody here yet)".to_string();
    }

    view.iter()
        .map(|p| {
            let marker = if p.is_coordinator() { "👑" } else { "  " };
            format!("{} {} ({}) [{}]", marker, p.display_name(), p.user_id(), p.role())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints session notifications to a writer (stdout by default)
pub struct ConsoleObserver<W: Write + Send + 'static = std::io::Stdout> {
    out: W,
    started: bool,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send + 'static> ConsoleObserver<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            started: false,
        }
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            tracing::warn!("Failed to write to console: {}", e);
        }
    }
}

impl<W: Write + Send + 'static> LobbyObserver for ConsoleObserver<W> {
    fn on_membership_changed(&mut self, view: &MembershipView) {
        tracing::debug!("📥 Membership changed: {} participant(s)", view.len());
        let text = format!("Lobby ({} participant(s)):\n{}", view.len(), render_view(view));
        self.print(&text);
    }

    fn on_started(&mut self) {
        self.started = true;
        self.print("🚀 Activity started!");
    }

    fn on_error(&mut self, kind: ErrorKind, detail: &str) {
        if kind.is_recoverable() {
            tracing::warn!("{}: {}", kind, detail);
        } else {
            tracing::error!("{}: {}", kind, detail);
        }
        self.print(&format!("⚠️  {}: {}", kind, detail));
    }
}
