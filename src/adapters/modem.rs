//! SIM800L GSM modem adapter.
//!
//! Implements [`MessagingPort`] and [`TimeSourcePort`] with text-mode AT
//! commands over a byte link.  The link is a trait so the firmware can
//! hand in the ESP-IDF UART and tests a scripted transcript.
//!
//! ## Receive path
//!
//! The modem is configured with `AT+CNMI=1,2,0,0,0`, so incoming SMS are
//! pushed unsolicited as
//!
//! ```text
//! +CMT: "+15550001111","","25/10/21,18:52:24+32"\r\n
//! VAPOR STATUS\r\n
//! ```
//!
//! Every byte read (also while waiting for a command reply) is scanned for
//! these frames; complete ones move to a small inbox drained by
//! [`MessagingPort::poll_incoming`].

use log::{debug, info, warn};

use crate::app::ports::{MessagingPort, TimeSourcePort};
use crate::error::SendError;

/// Reply wait for ordinary commands.
pub const COMMAND_TIMEOUT_MS: u32 = 1_000;
/// Wait for the `>` body prompt after `AT+CMGS`.
pub const PROMPT_TIMEOUT_MS: u32 = 5_000;
/// Wait for the network to accept a message.
pub const SEND_TIMEOUT_MS: u32 = 10_000;

const CTRL_Z: u8 = 0x1A;
const INBOX_CAP: usize = 4;
const RX_LIMIT: usize = 1024;

/// Setup sequence run once at boot.
pub const INIT_SEQUENCE: [&str; 5] = [
    "AT",
    "AT+CSCS=\"GSM\"",
    "AT+CNMI=1,2,0,0,0",
    "AT+CMGF=1",
    "AT+CMGDA=\"DEL ALL\"",
];

/// Raw byte transport to the modem.
pub trait ModemLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SendError>;

    /// Wait up to `timeout_ms` for data and copy what is available into
    /// `buf`.  Returns 0 if nothing arrived.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> usize;
}

/// Remove the first complete `+CMT:` frame from `buffer` and return its body.
/// Text around the frame is left in place.
///
/// The header ends at its line break; the body runs up to the modem's
/// closing `\r\n`, so a message typed on several lines (bare LFs) stays
/// whole.
pub fn take_cmt(buffer: &mut String) -> Option<String> {
    let start = buffer.find("+CMT:")?;
    let header_len = buffer[start..].find('\n')? + 1;
    let body_start = start + header_len;
    let body_len = buffer[body_start..].find("\r\n")?;
    let body = buffer[body_start..body_start + body_len].to_string();
    buffer.replace_range(start..body_start + body_len + 2, "");
    Some(body)
}

/// End offset of the earliest result code in `rx` that starts a line.
///
/// `+CMS ERROR` / `+CME ERROR` count as line starts for `ERROR`.  Nothing at
/// or after an unfinished `+CMT:` frame is considered: those bytes belong to
/// an SMS body still arriving.
fn find_result(rx: &str, terminators: &[&str]) -> Option<usize> {
    let scan = rx.find("+CMT:").map_or(rx, |pending| &rx[..pending]);
    terminators
        .iter()
        .filter_map(|t| {
            scan.match_indices(t)
                .find(|&(i, _)| {
                    let before = &scan[..i];
                    before.is_empty()
                        || before.ends_with('\n')
                        || before.ends_with("+CMS ")
                        || before.ends_with("+CME ")
                })
                .map(|(i, _)| i + t.len())
        })
        .min()
}

pub struct Sim800Modem<L: ModemLink> {
    link: L,
    rx: String,
    inbox: heapless::Deque<String, INBOX_CAP>,
}

impl<L: ModemLink> Sim800Modem<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            rx: String::new(),
            inbox: heapless::Deque::new(),
        }
    }

    /// Run [`INIT_SEQUENCE`].  Fails only if the modem does not answer
    /// the first `AT`; later commands are logged and skipped.
    pub fn init(&mut self) -> Result<(), SendError> {
        for (i, cmd) in INIT_SEQUENCE.iter().enumerate() {
            match self.command(cmd, COMMAND_TIMEOUT_MS) {
                Some(reply) if reply.contains("OK") => debug!("{} -> OK", cmd),
                Some(reply) => warn!("{} -> {:?}", cmd, reply.trim()),
                None if i == 0 => return Err(SendError::Timeout),
                None => warn!("{} -> no reply", cmd),
            }
        }
        info!("SIM800 initialised");
        Ok(())
    }

    /// Send one command and wait for its final result code.
    pub fn command(&mut self, cmd: &str, timeout_ms: u32) -> Option<String> {
        self.write_line(cmd).ok()?;
        self.await_reply(&["OK\r\n", "ERROR"], timeout_ms)
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    fn write_line(&mut self, line: &str) -> Result<(), SendError> {
        self.link.write_all(line.as_bytes())?;
        self.link.write_all(b"\r\n")
    }

    /// Read once; false if the link stayed silent.
    fn pump(&mut self, timeout_ms: u32) -> bool {
        let mut buf = [0u8; 128];
        let n = self.link.read(&mut buf, timeout_ms);
        if n == 0 {
            return false;
        }
        self.rx.push_str(&String::from_utf8_lossy(&buf[..n]));
        while let Some(body) = take_cmt(&mut self.rx) {
            if self.inbox.push_back(body).is_err() {
                warn!("SMS inbox full, dropping message");
            }
        }
        if self.rx.len() > RX_LIMIT {
            self.rx.clear();
        }
        true
    }

    /// Consume `rx` up to and including the earliest terminator.
    fn await_reply(&mut self, terminators: &[&str], timeout_ms: u32) -> Option<String> {
        loop {
            if let Some(end) = find_result(&self.rx, terminators) {
                return Some(self.rx.drain(..end).collect());
            }
            if !self.pump(timeout_ms) {
                return None;
            }
        }
    }

    /// Drop complete lines that are not part of a pending `+CMT:` frame.
    fn discard_noise(&mut self) {
        if self.rx.contains("+CMT:") {
            return;
        }
        if let Some(last_nl) = self.rx.rfind('\n') {
            self.rx.drain(..=last_nl);
        }
    }
}

impl<L: ModemLink> MessagingPort for Sim800Modem<L> {
    fn send(&mut self, number: &str, body: &str) -> Result<(), SendError> {
        if self.command("AT+CMGF=1", COMMAND_TIMEOUT_MS).is_none() {
            warn!("AT+CMGF=1 -> no reply");
        }
        self.write_line(&format!("AT+CMGS=\"{}\"", number))?;
        let prompt = self
            .await_reply(&[">", "ERROR"], PROMPT_TIMEOUT_MS)
            .ok_or(SendError::Timeout)?;
        if prompt.contains("ERROR") {
            return Err(SendError::TransportUnavailable);
        }

        self.link.write_all(body.as_bytes())?;
        self.link.write_all(&[CTRL_Z])?;

        let reply = self
            .await_reply(&["OK\r\n", "ERROR"], SEND_TIMEOUT_MS)
            .ok_or(SendError::Timeout)?;
        if reply.contains("ERROR") {
            return Err(SendError::TransportUnavailable);
        }
        debug!("SMS to {} accepted", number);
        Ok(())
    }

    fn poll_incoming(&mut self) -> Option<String> {
        while self.pump(0) {}
        self.discard_noise();
        self.inbox.pop_front()
    }
}

impl<L: ModemLink> TimeSourcePort for Sim800Modem<L> {
    fn network_time(&mut self) -> Option<String> {
        let reply = self.command("AT+CCLK?", COMMAND_TIMEOUT_MS)?;
        debug!("GSM response: {:?}", reply.trim());
        reply.contains("+CCLK:").then_some(reply)
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF UART link
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use uart::UartLink;

#[cfg(target_os = "espidf")]
mod uart {
    use esp_idf_hal::delay::{NON_BLOCK, TickType};
    use esp_idf_hal::uart::UartDriver;

    use super::ModemLink;
    use crate::error::SendError;

    pub struct UartLink<'d> {
        uart: UartDriver<'d>,
    }

    impl<'d> UartLink<'d> {
        pub fn new(uart: UartDriver<'d>) -> Self {
            Self { uart }
        }
    }

    impl ModemLink for UartLink<'_> {
        fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), SendError> {
            while !bytes.is_empty() {
                match self.uart.write(bytes) {
                    Ok(0) | Err(_) => return Err(SendError::TransportUnavailable),
                    Ok(n) => bytes = &bytes[n..],
                }
            }
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> usize {
            if buf.is_empty() {
                return 0;
            }
            let ticks = TickType::new_millis(u64::from(timeout_ms)).ticks();
            let first = match self.uart.read(&mut buf[..1], ticks) {
                Ok(n) if n > 0 => n,
                _ => return 0,
            };
            first + self.uart.read(&mut buf[1..], NON_BLOCK).unwrap_or(0)
        }
    }
}
