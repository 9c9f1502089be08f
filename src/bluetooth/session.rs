use std::fmt::Display;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::drivers::bthid::control::{handle_message, ControlAction};
use crate::drivers::bthid::hid_report::HidReport;
use crate::input::multiplexer::EventQueue;
use crate::input::state::InputState;
use crate::input::translator::{EventTranslator, Outcome};
use crate::sync::ShutdownSignal;

use super::l2cap::{Channel, ChannelError, ChannelListener};

/// Wait for a control connection, re-checked every tick
pub const CONTROL_ACCEPT_TICK: Duration = Duration::from_secs(1);
/// Deadline for the interrupt connection once the control channel is up
pub const INTERRUPT_ACCEPT_DEADLINE: Duration = Duration::from_secs(3);
/// Pause after a session closes before accepting the next one
pub const CLOSE_GUARD: Duration = Duration::from_millis(500);
/// Upper bound of a single wait for input while connected
pub const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Largest control message we expect from the host
const CONTROL_BUFFER_SIZE: usize = 64;

/// Fatal errors while running sessions
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Control channel listener failed: {0}")]
    ControlListener(ChannelError),
    #[error("Interrupt channel listener failed: {0}")]
    InterruptListener(ChannelError),
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    WaitingControl,
    WaitingInterrupt,
    Connected,
    Closing,
    ShuttingDown,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "Idle",
            Phase::WaitingControl => "WaitingControl",
            Phase::WaitingInterrupt => "WaitingInterrupt",
            Phase::Connected => "Connected",
            Phase::Closing => "Closing",
            Phase::ShuttingDown => "ShuttingDown",
        };
        write!(f, "{name}")
    }
}

/// Why a connected session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    SendFailed,
    Disconnect,
    ControlClosed,
    Unplugged,
    Shutdown,
}

/// Accepts paired control and interrupt connections from the remote host
/// and streams translated input reports while connected.
pub struct SessionManager<L, Q>
where
    L: ChannelListener,
    Q: EventQueue,
{
    control_listener: L,
    interrupt_listener: L,
    input: Q,
    translator: EventTranslator,
    state: InputState,
    shutdown: ShutdownSignal,
    phase: Phase,
}

impl<L, Q> SessionManager<L, Q>
where
    L: ChannelListener,
    Q: EventQueue,
{
    pub fn new(
        control_listener: L,
        interrupt_listener: L,
        input: Q,
        translator: EventTranslator,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            control_listener,
            interrupt_listener,
            input,
            translator,
            state: InputState::default(),
            shutdown,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("Session phase: {} -> {}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Run sessions until shutdown is requested.
    pub fn run(&mut self) -> Result<(), SessionError> {
        loop {
            self.set_phase(Phase::Idle);
            if self.shutdown.should_stop(false) {
                break;
            }
            self.discard_input();

            // Wait for the host to open the control channel
            self.set_phase(Phase::WaitingControl);
            let control = match self.control_listener.accept_timeout(CONTROL_ACCEPT_TICK) {
                Ok(Some(channel)) => channel,
                Ok(None) => continue,
                Err(e @ ChannelError::Poll(_)) => return Err(SessionError::ControlListener(e)),
                Err(e) => {
                    log::warn!("Failed to accept control connection: {e}");
                    continue;
                }
            };
            log::info!("Control channel connected from {}", control.peer());

            // The interrupt channel must follow within a fixed deadline
            self.set_phase(Phase::WaitingInterrupt);
            let interrupt = match self.interrupt_listener.accept_timeout(INTERRUPT_ACCEPT_DEADLINE) {
                Ok(Some(channel)) => channel,
                Ok(None) => {
                    log::warn!("No interrupt connection from {}, closing", control.peer());
                    continue;
                }
                Err(e @ ChannelError::Poll(_)) => {
                    return Err(SessionError::InterruptListener(e))
                }
                Err(e) => {
                    log::warn!("Failed to accept interrupt connection: {e}");
                    continue;
                }
            };
            log::info!("Interrupt channel connected from {}", interrupt.peer());

            let peer = control.peer().to_string();
            let reason = self.serve(control, interrupt);

            self.set_phase(Phase::Closing);
            log::info!("Connection to {peer} closed ({reason:?})");
            if reason != CloseReason::Shutdown {
                thread::sleep(CLOSE_GUARD);
            }
        }

        self.set_phase(Phase::ShuttingDown);
        Ok(())
    }

    /// Stream reports until the session ends. Both channels are closed when
    /// they go out of scope.
    fn serve(&mut self, mut control: L::Conn, mut interrupt: L::Conn) -> CloseReason {
        self.state.reset();
        match self.input.drain() {
            Ok(events) if !events.is_empty() => {
                log::debug!("Discarded {} events queued while connecting", events.len())
            }
            Ok(_) => (),
            Err(e) => log::debug!("Failed to drain input: {e}"),
        }
        self.set_phase(Phase::Connected);

        loop {
            if self.shutdown.should_stop(true) {
                return CloseReason::Shutdown;
            }
            if let Some(reason) = service_control(&mut control) {
                return reason;
            }

            let event = match self.input.next_event(INPUT_POLL_TIMEOUT) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(e) => {
                    log::debug!("Failed to read input: {e}");
                    continue;
                }
            };

            match self.translator.translate(&mut self.state, event) {
                Outcome::Nothing => (),
                Outcome::Report(report) => {
                    if !send_report(&mut interrupt, &report) {
                        return CloseReason::SendFailed;
                    }
                }
                Outcome::Burst(reports) => {
                    for report in reports.iter() {
                        if !send_report(&mut interrupt, report) {
                            return CloseReason::SendFailed;
                        }
                    }
                }
                Outcome::Disconnect {
                    final_report,
                    shutdown,
                } => {
                    send_report(&mut interrupt, &final_report);
                    if shutdown {
                        self.shutdown.request();
                    }
                    return CloseReason::Disconnect;
                }
            }
        }
    }

    /// Consume input that arrived while no host is connected. Events still
    /// pass through the translator so the control key keeps working, but no
    /// report is sent.
    fn discard_input(&mut self) {
        let events = match self.input.drain() {
            Ok(events) => events,
            Err(e) => {
                log::debug!("Failed to drain input: {e}");
                return;
            }
        };
        for event in events {
            if let Outcome::Disconnect { shutdown: true, .. } =
                self.translator.translate(&mut self.state, event)
            {
                self.shutdown.request();
            }
        }
    }
}

/// Send a single report, returning false if the channel is unusable.
fn send_report<C: Channel>(channel: &mut C, report: &HidReport) -> bool {
    let data = match report.to_bytes() {
        Ok(data) => data,
        Err(e) => {
            log::error!("Failed to encode report: {e:?}");
            return false;
        }
    };
    match channel.send(data.as_slice()) {
        Ok(0) => {
            log::warn!("Report was not sent");
            false
        }
        Ok(_) => true,
        Err(e) => {
            log::warn!("Failed to send report: {e}");
            false
        }
    }
}

/// Answer pending control channel messages. Returns a reason if the
/// session must end.
fn service_control<C: Channel>(control: &mut C) -> Option<CloseReason> {
    let mut buf = [0; CONTROL_BUFFER_SIZE];
    loop {
        let count = match control.try_recv(&mut buf) {
            Ok(None) => return None,
            Ok(Some(0)) => return Some(CloseReason::ControlClosed),
            Ok(Some(count)) => count,
            Err(e) => {
                log::debug!("Control channel failed: {e}");
                return Some(CloseReason::ControlClosed);
            }
        };

        let message = &buf[..count];
        log::trace!("Control message: {message:02x?}");
        match handle_message(message) {
            ControlAction::Reply(reply) => {
                if let Err(e) = control.send(reply.as_slice()) {
                    log::debug!("Failed to answer control message: {e}");
                    return Some(CloseReason::ControlClosed);
                }
            }
            ControlAction::Unplug => {
                log::info!("Host unplugged the virtual cable");
                return Some(CloseReason::Unplugged);
            }
            ControlAction::Ignore => (),
        }
    }
}
