use anyhow::{Result, anyhow};
use tracing::instrument;
use xcb::{
    Connection,
    screensaver::{QueryInfo, QueryInfoReply},
    x::{Drawable, Window},
};

use super::IdleSource;

/// Reads inactivity through the MIT-SCREEN-SAVER extension.
pub struct LinuxIdleSource {
    connection: Connection,
    root: Window,
}

impl LinuxIdleSource {
    pub fn new() -> Result<Self> {
        let (connection, preferred_screen) =
            Connection::connect_with_extensions(None, &[xcb::Extension::ScreenSaver], &[])?;

        // Currently the application only supports 1 x11 screen.
        let root = connection
            .get_setup()
            .roots()
            .nth(preferred_screen.max(0) as usize)
            .ok_or_else(|| anyhow!("X11 screen {preferred_screen} doesn't exist"))?
            .root();
        Ok(Self { connection, root })
    }
}

impl IdleSource for LinuxIdleSource {
    #[instrument(skip(self))]
    fn get_idle_time(&mut self) -> Result<u32> {
        let idle = self.connection.send_request(&QueryInfo {
            drawable: Drawable::Window(self.root),
        });
        let reply: QueryInfoReply = self.connection.wait_for_reply(idle)?;
        Ok(reply.ms_since_user_input())
    }
}
