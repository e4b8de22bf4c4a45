//! Assistant conversation sessions.
//!
//! A session owns an append-only transcript that always starts with one
//! greeting turn. Opening a session or resetting it to a new context (a device
//! page, or the general knowledge page) discards the old transcript and seeds a
//! fresh greeting. Nothing else removes turns.
//!
//! Every reset starts a new generation. An answer is recorded only into the
//! generation its question was asked in, so a reply that arrives after a reset
//! never leaks into the new conversation.

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Instruction sent with every question.
pub const SYSTEM_INSTRUCTION: &str = "你是一位醫學影像科（放射科）的資深主治醫師。請針對放射師或護理師的提問，提供關於健檢常見疾病的影像學特徵，或是醫學影像檢查（CT, MRI, X-ray, 超音波等）的注意事項與SOP。
要求：
1. 回答必須專業、準確、簡明扼要。使用列點方式說明。
2. 若提及被檢查的人，必須一律使用「受檢者」或「客戶」稱呼，絕對不可使用「病患」或「病人」。
3. 結語加上一句溫馨的提醒。
4. 語言：繁體中文。";

/// Greeting for the general knowledge page.
pub const GENERAL_GREETING: &str = "您好！我是影像醫學部的 AI 助理。您可以詢問我關於健檢常見疾病的影像特徵，或是各項檢查儀器的標準操作流程（SOP）。有什麼我可以幫忙的嗎？";

/// Answer recorded when the service returns no text.
pub const EMPTY_ANSWER: &str = "無法生成內容。";

/// Answer recorded when the service call fails.
pub const FAILURE_ANSWER: &str = "⚠️ 發生錯誤：伺服器目前繁忙，請稍後再試。";

const DEVICE_TITLES: &[(&str, &str)] = &[
    ("MR", "磁振造影 (MRI)"),
    ("CT", "電腦斷層 (CT)"),
    ("X-Ray", "一般攝影 (X-Ray)"),
    ("US", "超音波 (Ultrasound)"),
    ("MG", "乳房攝影 (Mammography)"),
    ("BMD", "骨質密度 (DXA)"),
];

/// Display title of a modality key, or the key itself when unknown.
#[must_use]
pub fn device_title(key: &str) -> &str {
    DEVICE_TITLES
        .iter()
        .find(|(known, _)| *known == key)
        .map_or(key, |(_, title)| *title)
}

/// Canned question behind the "ask for SOP" shortcut.
#[must_use]
pub fn sop_question(device: &str) -> String {
    format!("請提供「{device}」儀器的標準操作流程 (SOP) 以及針對受檢者的注意事項？")
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// One message in a transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// What the conversation is about; decides the greeting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssistantContext {
    General,
    Device(String),
}

impl AssistantContext {
    /// Blank or absent device keys mean the general context.
    #[must_use]
    pub fn from_device(device: Option<&str>) -> Self {
        match device.map(str::trim) {
            Some(key) if !key.is_empty() => Self::Device(key.to_string()),
            _ => Self::General,
        }
    }

    #[must_use]
    pub fn greeting(&self) -> String {
        match self {
            Self::General => GENERAL_GREETING.to_string(),
            Self::Device(key) => format!(
                "您好！我是{}的專屬 AI 助理。請告訴我您想查詢的檢查項目或操作問題。",
                device_title(key)
            ),
        }
    }
}

/// Maps a completion outcome to the text recorded as the assistant's turn.
/// Failures are logged here and never propagate further.
#[must_use]
pub fn answer_text(outcome: Result<String>) -> String {
    match outcome {
        Ok(text) if text.trim().is_empty() => {
            warn!("Completion service returned no text");
            EMPTY_ANSWER.to_string()
        }
        Ok(text) => text,
        Err(e) => {
            error!("Completion service error: {}", e);
            FAILURE_ANSWER.to_string()
        }
    }
}

#[derive(Clone, Debug)]
pub struct AssistantSession {
    context: AssistantContext,
    transcript: Vec<Turn>,
    generation: u64,
}

impl AssistantSession {
    /// Starts a transcript holding only the greeting for `context`.
    #[must_use]
    pub fn open(context: AssistantContext) -> Self {
        let transcript = vec![Turn::ai(context.greeting())];
        Self {
            context,
            transcript,
            generation: 0,
        }
    }

    /// Switches to `context`, replacing the transcript with a fresh greeting
    /// and starting a new generation.
    pub fn reset(&mut self, context: AssistantContext) {
        let generation = self.generation + 1;
        *self = Self::open(context);
        self.generation = generation;
    }

    /// Bumped by every [`AssistantSession::reset`].
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn context(&self) -> &AssistantContext {
        &self.context
    }

    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Appends the user's question. Returns `false`, appending nothing, when
    /// the question is blank.
    pub fn push_question(&mut self, question: &str) -> bool {
        if question.trim().is_empty() {
            return false;
        }
        self.transcript.push(Turn::user(question));
        true
    }

    /// Appends an answer to a question asked in `generation`. Returns `false`,
    /// appending nothing, when the session was reset since.
    pub fn record_answer(&mut self, generation: u64, answer: Turn) -> bool {
        if generation != self.generation {
            return false;
        }
        self.transcript.push(answer);
        true
    }
}
