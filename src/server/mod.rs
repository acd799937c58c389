// Server module entry point
// Binds the listener and runs the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::logger::ServerEvents;
use connection::accept_connection;

pub use listener::create_listener;
pub use signal::shutdown_signal;

/// A bound server, ready to accept
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Bind to `server.host:server.port`.
    ///
    /// Port 0 picks a free port; see [`Server::local_addr`]. Must be called
    /// from inside a Tokio runtime.
    pub fn bind(config: Config, events: Arc<dyn ServerEvents>) -> io::Result<Self> {
        let addr = config
            .socket_addr()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let listener = create_listener(addr)?;

        Ok(Self {
            listener,
            state: Arc::new(AppState::new(config, events)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever
    pub async fn run(self) -> io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already being served keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let events = Arc::clone(&self.state.events);
        events.listening(self.local_addr()?);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            accept_connection(
                                stream,
                                peer_addr,
                                &self.state,
                                &self.active_connections,
                            );
                        }
                        Err(e) => events.connection_error(&format!("Failed to accept connection: {e}")),
                    }
                }

                () = &mut shutdown => {
                    events.shutting_down();
                    return Ok(());
                }
            }
        }
    }
}
