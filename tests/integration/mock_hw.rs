//! Mock station hardware for integration tests.
//!
//! One value implements every port: a recording 20x4 display, a scripted
//! keypad, a scripted billing server, a simulated RFID card, an energy
//! meter replaying samples, and a restart counter.

use std::collections::{HashMap, VecDeque};

use echarger::app::ports::{CardEdge, CardReader, Display, EnergyMeter, Key, Keypad, ServerPort, SystemControl};
use echarger::config::StationConfig;
use echarger::protocol::codec::{self, Frame, encode_to_vec};
use echarger::protocol::receiver::FrameAssembler;
use echarger::{CardError, FrameError, LinkError};
use embedded_hal::delay::DelayNs;

/// Consecutive empty polls after which a script is considered exhausted.
const STARVATION_POLLS: u32 = 1_000_000;

/// Billing server id as seen on the wire.
pub const SERVER_ID: u8 = 1;
/// Station id as seen on the wire.
pub const STATION_ID: u8 = 2;

/// Config with bounded waits so a missing reply fails instead of hanging.
pub fn test_config() -> StationConfig {
    StationConfig {
        reply_poll_limit: 200,
        card_poll_limit: 200,
        ..StationConfig::default()
    }
}

// ── Keypad script ─────────────────────────────────────────────

/// A key press, optionally held back until `gate` is on screen.
struct ScriptedKey {
    gate: Option<&'static str>,
    key: Key,
}

// ── Card ──────────────────────────────────────────────────────

/// Simulated card plus reader: answers each command once its bytes stop
/// arriving, then raises the data line for the reply.
pub struct SimCard {
    pub present: bool,
    pub uid: [u8; 7],
    pub blocks: [[u8; 16]; 6],
    pub commands: Vec<Vec<u8>>,
    command: Vec<u8>,
    reply: VecDeque<u8>,
    replying: bool,
    edges: VecDeque<CardEdge>,
}

impl SimCard {
    pub fn new() -> Self {
        let mut blocks = [[0u8; 16]; 6];
        blocks[1][..4].copy_from_slice(b"4321");
        blocks[2][..5].copy_from_slice(b"12.50");
        blocks[4][..5].copy_from_slice(b"30.00");
        blocks[5][..4].copy_from_slice(b"2.00");
        Self {
            present: true,
            uid: [0x04, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E, 0x6F],
            blocks,
            commands: Vec::new(),
            command: Vec::new(),
            reply: VecDeque::new(),
            replying: false,
            edges: VecDeque::new(),
        }
    }

    /// Card id as the station renders it.
    pub const UID_TEXT: &'static str = "6F5E4D3C2B1A04";

    pub fn block_text(&self, address: usize) -> String {
        let block = &self.blocks[address];
        let end = block.iter().position(|&b| b == 0).unwrap_or(block.len());
        String::from_utf8_lossy(&block[..end]).into_owned()
    }

    fn answer(&mut self) {
        let cmd = std::mem::take(&mut self.command);
        self.reply.clear();
        match cmd.as_slice() {
            [0x55] => self.reply.extend(self.uid),
            [0x52, blk, 0x01] => {
                self.reply.push_back(0x00);
                self.reply.extend(self.blocks[usize::from(*blk)]);
            }
            [0x57, blk, 0x01, data @ ..] => {
                let slot = &mut self.blocks[usize::from(*blk)];
                slot.fill(0);
                slot[..data.len()].copy_from_slice(data);
                self.reply.push_back(0x00);
            }
            _ => {}
        }
        self.commands.push(cmd);
        self.replying = true;
    }
}

// ── MockStation ───────────────────────────────────────────────

pub struct MockStation {
    screen: [[char; 20]; 4],
    /// Every `display_text` call as `(x, y, text)`.
    pub writes: Vec<(u8, u8, String)>,
    keys: VecDeque<ScriptedKey>,
    idle_key_polls: u32,

    replies: HashMap<u8, VecDeque<Vec<u8>>>,
    inbound: VecDeque<u8>,
    assembler: FrameAssembler,
    idle_frame_polls: u32,
    /// Every frame the station sent.
    pub sent: Vec<Frame>,

    pub card: SimCard,
    samples: VecDeque<f32>,
    pub restarts: u32,
    pub delayed_ms: u64,
}

#[allow(dead_code)]
impl MockStation {
    pub fn new() -> Self {
        Self {
            screen: [[' '; 20]; 4],
            writes: Vec::new(),
            keys: VecDeque::new(),
            idle_key_polls: 0,
            replies: HashMap::new(),
            inbound: VecDeque::new(),
            assembler: FrameAssembler::new(),
            idle_frame_polls: 0,
            sent: Vec::new(),
            card: SimCard::new(),
            samples: VecDeque::new(),
            restarts: 0,
            delayed_ms: 0,
        }
    }

    // ── Scripting ─────────────────────────────────────────────

    /// Queue a key press delivered on the next poll.
    pub fn press(&mut self, key: Key) -> &mut Self {
        self.keys.push_back(ScriptedKey { gate: None, key });
        self
    }

    /// Queue a key press delivered once `gate` is visible.
    pub fn press_on(&mut self, gate: &'static str, key: Key) -> &mut Self {
        self.keys.push_back(ScriptedKey { gate: Some(gate), key });
        self
    }

    /// Queue the digits of `pin`, typed once the PIN prompt is shown.
    pub fn type_pin(&mut self, pin: &str) -> &mut Self {
        for c in pin.chars() {
            let key = Key::from_char(c).expect("pin digit");
            self.press_on("Enter PIN:", key);
        }
        self
    }

    /// Answer the next `request` frame with `reply` carrying `payload`.
    pub fn reply(&mut self, request: u8, reply: u8, payload: &[u8]) -> &mut Self {
        let wire = encode_to_vec(SERVER_ID, STATION_ID, reply, payload).expect("encodable reply");
        self.replies.entry(request).or_default().push_back(wire.to_vec());
        self
    }

    /// Answer the next `request` frame with raw bytes.
    pub fn reply_raw(&mut self, request: u8, bytes: &[u8]) -> &mut Self {
        self.replies.entry(request).or_default().push_back(bytes.to_vec());
        self
    }

    pub fn samples(&mut self, samples: &[f32]) -> &mut Self {
        self.samples.extend(samples);
        self
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn row(&self, y: usize) -> String {
        self.screen[y].iter().collect()
    }

    pub fn screen_contains(&self, text: &str) -> bool {
        (0..4).any(|y| self.row(y).contains(text))
    }

    /// `text` was written to the display at some point.
    pub fn shown(&self, text: &str) -> bool {
        self.writes.iter().any(|(_, _, t)| t.contains(text))
    }

    /// Command codes of every frame sent, in order.
    pub fn sent_commands(&self) -> Vec<u8> {
        self.sent.iter().map(|f| f.command).collect()
    }

    pub fn sent_payload(&self, command: u8) -> Option<String> {
        self.sent
            .iter()
            .find(|f| f.command == command)
            .map(|f| f.payload_str().to_owned())
    }

    pub fn keys_left(&self) -> usize {
        self.keys.len()
    }
}

impl Display for MockStation {
    fn clear_display(&mut self) {
        self.screen = [[' '; 20]; 4];
    }

    fn display_text(&mut self, x: u8, y: u8, text: &str) {
        assert!(y < 4, "row {y} off screen: {text:?}");
        let row = &mut self.screen[usize::from(y)];
        for (cell, c) in row.iter_mut().skip(usize::from(x)).zip(text.chars()) {
            *cell = c;
        }
        self.writes.push((x, y, text.to_owned()));
    }
}

impl Keypad for MockStation {
    fn poll_key(&mut self) -> Option<Key> {
        let ready = match self.keys.front() {
            Some(next) => next.gate.is_none_or(|gate| self.screen_contains(gate)),
            None => false,
        };
        if ready {
            self.idle_key_polls = 0;
            return self.keys.pop_front().map(|k| k.key);
        }
        self.idle_key_polls += 1;
        assert!(
            self.idle_key_polls < STARVATION_POLLS,
            "key script exhausted; screen:\n{}\n{}\n{}\n{}",
            self.row(0),
            self.row(1),
            self.row(2),
            self.row(3)
        );
        None
    }
}

impl EnergyMeter for MockStation {
    fn sample_energy(&mut self) -> f32 {
        self.samples.pop_front().unwrap_or(25.0)
    }
}

impl ServerPort for MockStation {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let inner = &bytes[2..bytes.len() - 2];
        let frame = codec::decode(inner)
            .and_then(|view| {
                view.verify()?;
                view.to_frame()
            })
            .expect("station sent a well-formed frame");
        if let Some(reply) = self.replies.get_mut(&frame.command).and_then(VecDeque::pop_front) {
            self.inbound.extend(reply);
        }
        self.sent.push(frame);
        Ok(())
    }

    fn poll_frame(&mut self) -> Option<Result<Frame, FrameError>> {
        while let Some(byte) = self.inbound.pop_front() {
            self.assembler.push(byte);
            if let Some(frame) = self.assembler.take_frame(true) {
                self.idle_frame_polls = 0;
                return Some(frame);
            }
        }
        self.idle_frame_polls += 1;
        assert!(self.idle_frame_polls < STARVATION_POLLS, "server script exhausted");
        None
    }
}

impl CardReader for MockStation {
    fn card_present(&self) -> bool {
        self.card.present
    }

    fn poll_edge(&mut self) -> Option<CardEdge> {
        let card = &mut self.card;
        if let Some(edge) = card.edges.pop_front() {
            return Some(edge);
        }
        if !card.present {
            return None;
        }
        if !card.command.is_empty() {
            card.answer();
            return Some(CardEdge::DataReady);
        }
        if card.replying && card.reply.is_empty() {
            card.replying = false;
            return Some(CardEdge::StartTransmit);
        }
        None
    }

    fn exchange(&mut self, byte: u8) -> Result<u8, CardError> {
        let card = &mut self.card;
        if !card.present {
            return Err(CardError::Absent);
        }
        if byte == 0xF5 && card.replying {
            return Ok(card.reply.pop_front().unwrap_or(0));
        }
        card.command.push(byte);
        Ok(0)
    }
}

impl SystemControl for MockStation {
    fn restart(&mut self) {
        self.restarts += 1;
    }
}

impl DelayNs for MockStation {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.delayed_ms += u64::from(ms);
    }
}
