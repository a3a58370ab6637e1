//! Output boundary between the instruction loop and the host display.
//!
//! The loop emits text chunks and discrete screen operations; the only
//! guarantee consumers get is that delivery order equals emission order.
//! Delivery is synchronous on the caller's thread - nothing here buffers,
//! reorders, or blocks.

use std::cell::RefCell;
use std::rc::Rc;

/// A discrete screen operation with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOp {
    ClearScreen,
    /// -1 clears the whole screen and unsplits, 0/1 erase one window
    EraseWindow { window: i16 },
    SplitWindow { lines: u16 },
    SetWindow { window: u8 },
    /// 1-based coordinates
    SetCursor { row: u16, column: u16 },
    SetTextStyle { style: u16 },
}

/// Receives events as they are emitted. Implementations must not block;
/// the producer is the single-threaded instruction loop.
pub trait OutputListener {
    fn text(&mut self, text: &str);
    fn screen_op(&mut self, op: &ScreenOp);
}

/// Fans each emission out to every attached listener, in attachment order,
/// strictly interleaved with the other stream
#[derive(Default)]
pub struct OutputBus {
    listeners: Vec<Box<dyn OutputListener>>,
}

impl OutputBus {
    pub fn new() -> OutputBus {
        OutputBus::default()
    }

    pub fn attach(&mut self, listener: Box<dyn OutputListener>) {
        self.listeners.push(listener);
    }

    pub fn write(&mut self, text: &str) {
        for listener in &mut self.listeners {
            listener.text(text);
        }
    }

    pub fn write_line(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }

    fn emit(&mut self, op: ScreenOp) {
        for listener in &mut self.listeners {
            listener.screen_op(&op);
        }
    }

    /// Clear the whole screen, or erase one window when `window` is 0 or 1
    pub fn clear_screen(&mut self, window: i16) {
        if window == -1 {
            self.emit(ScreenOp::ClearScreen);
        } else {
            self.emit(ScreenOp::EraseWindow { window });
        }
    }

    pub fn split_window(&mut self, lines: u16) {
        self.emit(ScreenOp::SplitWindow { lines });
    }

    pub fn set_window(&mut self, window: u8) {
        self.emit(ScreenOp::SetWindow { window });
    }

    pub fn set_cursor(&mut self, row: u16, column: u16) {
        self.emit(ScreenOp::SetCursor { row, column });
    }

    pub fn set_text_style(&mut self, style: u16) {
        self.emit(ScreenOp::SetTextStyle { style });
    }
}

/// One delivered event; the enum preserves interleaving across both streams
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    Text(String),
    Screen(ScreenOp),
}

/// Listener that records the event sequence. Clones share the same record,
/// so a host (or test) can keep one handle and attach the other to the bus.
#[derive(Clone, Default)]
pub struct CapturedOutput {
    events: Rc<RefCell<Vec<OutputEvent>>>,
}

impl CapturedOutput {
    pub fn new() -> CapturedOutput {
        CapturedOutput::default()
    }

    pub fn events(&self) -> Vec<OutputEvent> {
        self.events.borrow().clone()
    }

    /// Concatenation of the text chunks, ignoring screen operations
    pub fn text(&self) -> String {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                OutputEvent::Text(text) => Some(text.as_str()),
                OutputEvent::Screen(_) => None,
            })
            .collect()
    }
}

impl OutputListener for CapturedOutput {
    fn text(&mut self, text: &str) {
        self.events.borrow_mut().push(OutputEvent::Text(text.to_string()));
    }

    fn screen_op(&mut self, op: &ScreenOp) {
        self.events.borrow_mut().push(OutputEvent::Screen(*op));
    }
}
