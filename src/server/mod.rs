//! TCP command server — reactor-driven I/O thread.
//!
//! Line-based JSON over TCP (127.0.0.1:65432 by default).  Runs in a
//! dedicated thread using `edge-executor` for cooperative multi-task
//! scheduling and `async-io-mini` for reactor timers.  Three concurrent
//! futures:
//!
//! 1. **Accept** — polls the non-blocking listener every 50ms
//! 2. **Read** — polls connected clients every 5ms, feeding the line
//!    decoder; each decoded command is rate-limited, parsed, submitted
//!    to the router, and acknowledged on the same connection
//! 3. **Write** — truly async via `STATUS_CHANNEL.receive().await`;
//!    broadcasts every published snapshot to all connected clients
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  I/O Thread                                              │
//!  │  ┌────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                      │  │
//!  │  │  ┌─────────┐  ┌──────────┐  ┌─────────────────┐   │  │
//!  │  │  │ Accept  │  │ Read All │  │ Write (async)   │   │  │
//!  │  │  │ 50ms ⏱  │  │ 5ms ⏱   │  │ wake-on-publish │   │  │
//!  │  │  └─────────┘  └──────────┘  └─────────────────┘   │  │
//!  │  └────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! A malformed or flooded command costs its sender an error line at
//! worst; nothing at this boundary can crash the safety core.

pub mod codec;
pub mod protocol;

use std::cell::RefCell;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use burster::Limiter;
use log::{info, warn};

use crate::adapters::sinks::STATUS_CHANNEL;
use crate::app::ports::EventIngress;
use crate::config::SystemConfig;

use codec::LineDecoder;

/// Maximum simultaneously connected clients.
pub const MAX_CLIENTS: usize = 4;

const READ_BUF_SIZE: usize = 1024;

// ── Per-client state ─────────────────────────────────────────

struct ClientSlot {
    stream: TcpStream,
    decoder: LineDecoder,
}

type SharedClients = Rc<RefCell<[Option<ClientSlot>; MAX_CLIENTS]>>;
type SharedLimiter = Rc<RefCell<burster::TokenBucket<fn() -> Duration>>>;

fn platform_now() -> Duration {
    use std::time::Instant;
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}

/// Best-effort write; returns `false` when the client should be dropped.
fn write_line(stream: &mut TcpStream, line: &str) -> bool {
    match stream.write_all(line.as_bytes()) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::WouldBlock => {
            // A client that cannot absorb one line loses it.
            warn!("Server: slow client, dropping line");
            true
        }
        Err(_) => false,
    }
}

// ── Async tasks ──────────────────────────────────────────────

/// Accept task — checks for new connections at 50ms intervals.
async fn accept_loop(listener: TcpListener, clients: SharedClients) {
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                if stream.set_nonblocking(true).is_err() {
                    continue;
                }
                let mut slots = clients.borrow_mut();
                match slots.iter_mut().find(|slot| slot.is_none()) {
                    Some(slot) => {
                        info!("Server: client {addr} connected");
                        *slot = Some(ClientSlot {
                            stream,
                            decoder: LineDecoder::new(),
                        });
                    }
                    None => {
                        warn!("Server: rejecting {addr}, all {MAX_CLIENTS} slots busy");
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => warn!("Server: accept failed: {e}"),
        }
        async_io_mini::Timer::after(Duration::from_millis(50)).await;
    }
}

/// Read task — polls all connected clients at 5ms intervals.
async fn read_loop(clients: SharedClients, ingress: Arc<dyn EventIngress>, limiter: SharedLimiter) {
    let mut read_buf = [0u8; READ_BUF_SIZE];
    loop {
        {
            let mut slots = clients.borrow_mut();
            for slot in slots.iter_mut() {
                let Some(client) = slot else { continue };

                match client.stream.read(&mut read_buf) {
                    Ok(0) => {
                        info!("Server: client disconnected");
                        *slot = None;
                    }
                    Ok(n) => {
                        let mut acks = Vec::new();
                        client.decoder.feed(&read_buf[..n], |line| {
                            if limiter.borrow_mut().try_consume(1).is_err() {
                                warn!("Server: command rate limit exceeded, dropping frame");
                                return;
                            }
                            let result = parse_and_submit(line, &ingress);
                            acks.push(protocol::encode_ack(&result));
                        });
                        for ack in acks {
                            if !write_line(&mut client.stream, &ack) {
                                *slot = None;
                                break;
                            }
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                    Err(e) => {
                        warn!("Server: client read error ({e}), disconnecting");
                        *slot = None;
                    }
                }
            }
        }
        async_io_mini::Timer::after(Duration::from_millis(5)).await;
    }
}

fn parse_and_submit(
    line: &str,
    ingress: &Arc<dyn EventIngress>,
) -> crate::error::Result<crate::app::events::EventOutcome> {
    let event = protocol::parse_command(line).inspect_err(|e| {
        warn!("Server: rejected command: {e}");
    })?;
    ingress.submit(event)
}

/// Write task — wakes when the control side publishes a snapshot and
/// broadcasts it to every connected client.
async fn write_loop(clients: SharedClients) {
    loop {
        let snapshot = STATUS_CHANNEL.receive().await;
        let line = protocol::encode_status(&snapshot);

        let mut slots = clients.borrow_mut();
        for slot in slots.iter_mut() {
            if let Some(client) = slot {
                if !write_line(&mut client.stream, &line) {
                    warn!("Server: status write failed, disconnecting client");
                    *slot = None;
                }
            }
        }
    }
}

// ── Thread lifecycle ─────────────────────────────────────────

fn run_io_loop(
    listener: TcpListener,
    ingress: Arc<dyn EventIngress>,
    rate_limit_per_sec: u32,
    running: Arc<AtomicBool>,
) {
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    let clients: SharedClients = Rc::new(RefCell::new(core::array::from_fn(|_| None)));
    let limiter: SharedLimiter = Rc::new(RefCell::new(burster::TokenBucket::new_with_time_provider(
        rate_limit_per_sec as u64,
        rate_limit_per_sec as u64,
        platform_now as fn() -> Duration,
    )));

    executor
        .spawn(accept_loop(listener, clients.clone()))
        .detach();
    executor
        .spawn(read_loop(clients.clone(), ingress, limiter))
        .detach();
    executor.spawn(write_loop(clients.clone())).detach();

    info!("Server: I/O task started ({MAX_CLIENTS} max clients)");

    // The executor drives the three tasks until the stop flag drops;
    // the outer future polls it at 100ms so shutdown stays prompt.
    futures_lite::future::block_on(executor.run(async {
        while running.load(Ordering::Acquire) {
            async_io_mini::Timer::after(Duration::from_millis(100)).await;
        }
    }));
    info!("Server: I/O task stopped");
}

/// Handle to the running command server.
pub struct CommandServer {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CommandServer {
    /// Bind the listener and spawn the I/O thread.
    pub fn spawn(
        ingress: Arc<dyn EventIngress>,
        config: &SystemConfig,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind((config.listen_addr.as_str(), config.listen_port))?;
        listener.set_nonblocking(true)?;
        info!(
            "Server: listening on {}:{}",
            config.listen_addr, config.listen_port
        );

        let running = Arc::new(AtomicBool::new(true));
        let rate = config.command_rate_limit_per_sec;
        let thread_flag = running.clone();
        let handle = std::thread::spawn(move || {
            run_io_loop(listener, ingress, rate, thread_flag);
        });

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the I/O thread and join it.  Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Server: I/O thread panicked during shutdown");
            }
        }
    }
}

impl Drop for CommandServer {
    fn drop(&mut self) {
        self.stop();
    }
}
