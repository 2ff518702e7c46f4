use super::{login, logout, status, whoami, Action};
use anyhow::Result;

pub(super) async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::handle(args).await,
        Action::Logout(globals) => logout::handle(&globals),
        Action::Status(globals) => status::handle(&globals),
        Action::Whoami(globals) => whoami::handle(&globals).await,
    }
}
