//! The RFC 959 Data Port (`PORT`) command
//
// Records the client endpoint for an active-mode transfer. Any passive
// acceptor bound earlier is torn down; the two modes never coexist.

use async_trait::async_trait;

use std::net::SocketAddrV4;

use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::session::DataMode;

pub struct Port {
    addr: SocketAddrV4,
}

impl Port {
    pub fn new(addr: SocketAddrV4) -> Self {
        Port { addr }
    }
}

#[async_trait]
impl CommandHandler for Port {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.data_mode = DataMode::Active(self.addr);
        Ok(Reply::new(ReplyCode::CommandOkay, "PORT command successful"))
    }
}
