use log::Level;
use reqwest::Client;

use crate::chat_gpt::{
    ask_chat_gpt, build_http_client, parse_suggestions, ChatMessage, DiagnosticsRef, NameSuggestion,
    NamerError, ServiceConfig,
};
use crate::utils::naming_style::NamingStyle;

/// What kind of identifier the user wants named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Variable,
    Method,
}

impl NameKind {
    fn role(&self) -> &'static str {
        match self {
            NameKind::Variable => "variable naming",
            NameKind::Method => "function/method naming",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            NameKind::Variable => "variable",
            NameKind::Method => "method",
        }
    }
}

/// Everything needed to ask for names for one selection.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub selected_text: String,
    pub surrounding_context: String,
    pub target_language: String,
    pub naming_style: NamingStyle,
}

#[derive(Clone)]
pub struct SuggestionService {
    client: Client,
    diagnostics: DiagnosticsRef,
}

impl SuggestionService {
    pub fn new(diagnostics: DiagnosticsRef) -> Result<Self, NamerError> {
        Ok(Self {
            client: build_http_client()?,
            diagnostics,
        })
    }

    /// Ask the provider for 3-5 names for the selection.
    ///
    /// Makes exactly one HTTP request, or none when no API key is configured.
    /// An unparseable answer is an empty list, not an error.
    pub async fn request_names(
        &self,
        kind: NameKind,
        request: &GenerationRequest,
        config: &ServiceConfig,
    ) -> Result<Vec<NameSuggestion>, NamerError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(NamerError::Configuration)?;

        self.diagnostics.record(
            Level::Info,
            &format!(
                "requesting {} names from {} with model {}",
                kind.noun(),
                config.api_endpoint,
                config.model
            ),
        );

        let conversation_history = vec![
            ChatMessage::new_system(&system_prompt(kind)),
            ChatMessage::new_user(&render_prompt(kind, request)),
        ];

        let content = match ask_chat_gpt(&self.client, config, api_key, &conversation_history).await
        {
            Ok(content) => content,
            Err(e) => {
                self.diagnostics
                    .record(Level::Error, &format!("AI service call failed: {e}"));
                return Err(e);
            }
        };
        self.diagnostics
            .record(Level::Debug, &format!("AI service response: {content}"));

        let suggestions = parse_suggestions(&content);
        self.diagnostics.record(
            Level::Info,
            &format!("received {} name suggestions", suggestions.len()),
        );
        Ok(suggestions)
    }
}

fn system_prompt(kind: NameKind) -> String {
    format!(
        "You are a professional programming assistant specializing in {}. Respond only with JSON format as specified, no additional text.",
        kind.role()
    )
}

fn render_prompt(kind: NameKind, request: &GenerationRequest) -> String {
    let language = &request.target_language;
    let style = &request.naming_style;
    let noun = kind.noun();

    let mut rules = vec![
        format!(
            "Generate English {noun} names only, using ASCII characters, no Chinese or other non-English characters"
        ),
        format!("Every name must follow the {style} naming style"),
        format!("The name should clearly express the purpose and meaning of the {noun}"),
        "Avoid generic names such as data, info, value".to_string(),
        "Prefer semantically descriptive names, adding a prefix or suffix when the context calls for it"
            .to_string(),
    ];
    if kind == NameKind::Method {
        rules.push(
            "Method names must start with a verb, avoiding overly generic verbs such as do, handle, process"
                .to_string(),
        );
    }
    let rules = rules
        .iter()
        .enumerate()
        .map(|(index, rule)| format!("{}. {}", index + 1, rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a professional programming assistant who is good at {role}. Based on the text and context below, generate {style} {noun} names that fit the conventions of {language}.

Text: "{text}"

Context code:
```{language}
{context}
```

Important rules:
{rules}

Provide 3-5 high-quality {noun} name suggestions. Each suggestion includes:
1. the {noun} name
2. a short English explanation of why the name fits

Return them as JSON in exactly this format:
[
  {{
    "name": "suggestedName1",
    "explanation": "Clear explanation in English why this name is appropriate"
  }},
  {{
    "name": "suggestedName2",
    "explanation": "Clear explanation in English why this name is appropriate"
  }}
]

Return only the JSON data, no other text."#,
        role = kind.role(),
        text = request.selected_text,
        context = request.surrounding_context,
    )
}
