//! Driver debug output.
//!
//! [`install`] enables synchronous `KHR_debug` output and forwards every message to a
//! [`DebugSink`], which logs it under the `gl` target and keeps counts.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use glow::HasContext;

/// A single message reported by the driver. `text` borrows the driver's buffer for the
/// duration of the callback.
#[derive(Debug, Clone, Copy)]
pub struct DebugMessage<'a> {
    pub source: u32,
    pub kind: u32,
    pub id: u32,
    pub severity: u32,
    pub text: &'a str,
}

impl DebugMessage<'_> {
    pub fn source_name(&self) -> &'static str {
        match self.source {
            glow::DEBUG_SOURCE_API => "api",
            glow::DEBUG_SOURCE_WINDOW_SYSTEM => "window system",
            glow::DEBUG_SOURCE_SHADER_COMPILER => "shader compiler",
            glow::DEBUG_SOURCE_THIRD_PARTY => "third party",
            glow::DEBUG_SOURCE_APPLICATION => "application",
            _ => "other",
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            glow::DEBUG_TYPE_ERROR => "error",
            glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "deprecated behavior",
            glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "undefined behavior",
            glow::DEBUG_TYPE_PORTABILITY => "portability",
            glow::DEBUG_TYPE_PERFORMANCE => "performance",
            glow::DEBUG_TYPE_MARKER => "marker",
            glow::DEBUG_TYPE_PUSH_GROUP => "push group",
            glow::DEBUG_TYPE_POP_GROUP => "pop group",
            _ => "other",
        }
    }

    pub fn severity_name(&self) -> &'static str {
        match self.severity {
            glow::DEBUG_SEVERITY_HIGH => "high",
            glow::DEBUG_SEVERITY_MEDIUM => "medium",
            glow::DEBUG_SEVERITY_LOW => "low",
            _ => "notification",
        }
    }

    /// Log level for this message. Never below `Info`, so the default filter shows everything.
    pub fn level(&self) -> log::Level {
        match self.severity {
            glow::DEBUG_SEVERITY_HIGH => log::Level::Error,
            glow::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
            _ if self.is_error() => log::Level::Error,
            _ => log::Level::Info,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == glow::DEBUG_TYPE_ERROR
    }
}

impl fmt::Display for DebugMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (type: {}, severity: {}, source: {}, id: {})",
            self.text.trim_end(),
            self.kind_name(),
            self.severity_name(),
            self.source_name(),
            self.id
        )
    }
}

/// Receives driver messages.
#[derive(Debug, Default)]
pub struct DebugSink {
    messages: AtomicUsize,
    errors: AtomicUsize,
}

impl DebugSink {
    pub fn report(&self, message: &DebugMessage) {
        self.messages.fetch_add(1, Ordering::Relaxed);
        if message.is_error() {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        log::log!(target: "gl", message.level(), "{message}");
    }

    /// Messages received so far.
    pub fn message_count(&self) -> usize {
        self.messages.load(Ordering::Relaxed)
    }

    /// Messages of type `GL_DEBUG_TYPE_ERROR` received so far.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }
}

/// Turns on synchronous debug output and routes it to `sink`.
///
/// Returns `false` if the context has no debug output support.
pub fn install(gl: &mut glow::Context, sink: Arc<DebugSink>) -> bool {
    if !gl.supports_debug() {
        log::warn!("context does not support debug output");
        return false;
    }

    unsafe {
        gl.enable(glow::DEBUG_OUTPUT);
        gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
        gl.debug_message_callback(move |source, kind, id, severity, text| {
            sink.report(&DebugMessage {
                source,
                kind,
                id,
                severity,
                text,
            });
        });
    }

    true
}
