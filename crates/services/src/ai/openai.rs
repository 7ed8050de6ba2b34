use std::env;
use std::fmt::Write as _;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use mentor_core::model::QuestionKind;

use super::{GeneratedQuestion, GenerationRequest, QuestionGenerator};
use crate::error::GenerationError;

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl OpenAiConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("MENTOR_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("MENTOR_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("MENTOR_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Question generator speaking the OpenAI-compatible chat-completions
/// protocol, asking the model for a JSON object of questions.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    config: Option<OpenAiConfig>,
}

impl OpenAiGenerator {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(OpenAiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<OpenAiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl QuestionGenerator for OpenAiGenerator {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(request),
            }],
            temperature: 0.4,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::InvalidResponse("empty completion".into()))?;

        parse_questions(&content, request.max_questions)
    }
}

fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "You are an expert educational content creator.\n\
         Create up to {max} remedial quiz questions for a {difficulty} course on \"{topic}\".\n",
        max = request.max_questions,
        difficulty = request.difficulty,
        topic = request.course_topic,
    );

    if request.concepts.is_empty() {
        prompt.push_str("Cover the course broadly; no specific weak concepts were identified.\n");
    } else {
        prompt.push_str("Target these weak concepts:\n");
        for target in &request.concepts {
            let _ = writeln!(
                prompt,
                "- chapter {}: {} (missed: {})",
                target.chapter_number,
                target.concept,
                target.sample_wrong_questions.join("; "),
            );
        }
    }

    if request.include_hints {
        prompt.push_str("Include a short hint for every question that nudges without revealing the answer.\n");
    }

    prompt.push_str(
        "Mix multiple choice (4 lettered options, correct_answer is the letter) and \
         true/false (correct_answer is \"true\" or \"false\") questions.\n\
         Respond with JSON only, in this exact shape:\n\
         {\"questions\": [{\"id\": \"extra_1\", \"type\": \"mcq\", \"question\": \"...\", \
         \"options\": [\"A) ...\", \"B) ...\", \"C) ...\", \"D) ...\"], \"correct_answer\": \"A\", \
         \"explanation\": \"...\", \"hint\": null, \"difficulty\": \"easy\", \
         \"source_chapter\": 1, \"target_concept\": \"...\"}]}",
    );

    prompt
}

fn parse_questions(
    content: &str,
    max_questions: u32,
) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    let payload: QuestionsPayload = serde_json::from_str(content)
        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

    let mut questions = Vec::with_capacity(payload.questions.len());
    for wire in payload.questions {
        questions.push(wire.into_generated()?);
    }
    questions.truncate(usize::try_from(max_questions).unwrap_or(usize::MAX));
    Ok(questions)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionsPayload {
    #[serde(default)]
    questions: Vec<QuestionWire>,
}

/// Question as the model writes it; tolerant of boolean answers and the
/// original `question` field name.
#[derive(Debug, Deserialize)]
struct QuestionWire {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(alias = "question")]
    question_text: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    correct_answer: serde_json::Value,
    explanation: String,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    source_chapter: u32,
    #[serde(default)]
    target_concept: Option<String>,
}

impl QuestionWire {
    fn into_generated(self) -> Result<GeneratedQuestion, GenerationError> {
        let kind = QuestionKind::parse(&self.kind)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        let correct_answer = match self.correct_answer {
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::String(s) => s,
            other => {
                return Err(GenerationError::InvalidResponse(format!(
                    "unexpected correct_answer: {other}"
                )));
            }
        };
        Ok(GeneratedQuestion {
            id: self.id,
            kind,
            question_text: self.question_text,
            options: self.options,
            correct_answer,
            explanation: self.explanation,
            hint: self.hint,
            difficulty: self.difficulty,
            source_chapter: self.source_chapter,
            target_concept: self.target_concept,
        })
    }
}
