//! AI content generation.
//!
//! Resolves a prompt template, renders its variables, records a generation
//! row as 'processing', calls the hosted model, and finalizes the row as
//! 'completed' (output, token counts, timing, cost) or 'failed'
//! (error message). The row is written before the model call so every
//! attempt is visible in usage review, including ones that never returned.

use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::generation::{GenerateContentRequest, GenerateContentResponse};
use crate::models::prompt::{AiPrompt, DEFAULT_MODEL};
use crate::services::anthropic;
use std::time::Instant;
use uuid::Uuid;

/// System prompt used when no stored prompt applies.
const FALLBACK_SYSTEM_PROMPT: &str = "You are an expert B2B marketing copywriter. \
Create compelling, personalized ABM landing page content in markdown format.";

/// User prompt template used when no stored prompt applies.
const FALLBACK_TEMPLATE: &str = "Create engaging ABM landing page content for {{company_name}}.

Company context:
{{context}}

Create markdown content that includes:
- A compelling introduction paragraph
- 2-3 key value propositions with headers
- Specific benefits relevant to their industry/use case
- A call-to-action section

Use markdown formatting (headers, bold, lists, etc.). Be specific and personalized.";

/// Per-token pricing (USD per 1K tokens) used for the stored cost estimate.
const INPUT_COST_PER_1K: f64 = 0.003;
const OUTPUT_COST_PER_1K: f64 = 0.015;

/// A prompt ready to render: either a stored template or a fallback.
#[derive(Debug)]
struct ResolvedPrompt {
    id: Option<Uuid>,
    system_prompt: Option<String>,
    user_prompt_template: String,
    model: String,
    temperature: f32,
    max_tokens: i32,
}

impl ResolvedPrompt {
    fn fallback() -> Self {
        Self {
            id: None,
            system_prompt: Some(FALLBACK_SYSTEM_PROMPT.to_string()),
            user_prompt_template: FALLBACK_TEMPLATE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }

    fn custom(template: String) -> Self {
        Self {
            user_prompt_template: template,
            ..Self::fallback()
        }
    }
}

impl From<AiPrompt> for ResolvedPrompt {
    fn from(prompt: AiPrompt) -> Self {
        Self {
            id: Some(prompt.id),
            system_prompt: prompt.system_prompt,
            user_prompt_template: prompt.user_prompt_template,
            model: prompt.model,
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
        }
    }
}

/// Substitute template variables into a prompt template.
///
/// `{{context}}` and `{{transcript}}` both render the context argument,
/// with explicit placeholders when it is empty, so a template written for
/// either variable works.
pub fn render_template(template: &str, company_name: &str, context: &str) -> String {
    let context_value = if context.trim().is_empty() {
        "No additional context provided"
    } else {
        context
    };
    let transcript_value = if context.trim().is_empty() {
        "No transcript provided"
    } else {
        context
    };

    template
        .replace("{{company_name}}", company_name)
        .replace("{{context}}", context_value)
        .replace("{{transcript}}", transcript_value)
}

/// Estimated cost in USD for a completed generation.
fn estimate_cost(prompt_tokens: i32, completion_tokens: i32) -> f64 {
    (prompt_tokens as f64 * INPUT_COST_PER_1K + completion_tokens as f64 * OUTPUT_COST_PER_1K)
        / 1000.0
}

/// Pick the prompt for a generation request.
///
/// Order: custom text > explicit prompt id (404 when absent or foreign) >
/// the organization's default active page-content prompt > built-in
/// fallback.
async fn resolve_prompt(
    pool: &DbPool,
    organization_id: Uuid,
    request: &GenerateContentRequest,
) -> Result<ResolvedPrompt, AppError> {
    if let Some(custom) = &request.custom_prompt {
        return Ok(ResolvedPrompt::custom(custom.clone()));
    }

    if let Some(prompt_id) = request.prompt_id {
        let prompt = sqlx::query_as::<_, AiPrompt>(
            "SELECT * FROM ai_prompts WHERE id = $1 AND organization_id = $2",
        )
        .bind(prompt_id)
        .bind(organization_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::PromptNotFound)?;

        return Ok(prompt.into());
    }

    let default_prompt = sqlx::query_as::<_, AiPrompt>(
        r#"
        SELECT * FROM ai_prompts
        WHERE organization_id = $1
          AND prompt_type = 'page_content'
          AND is_default = TRUE
          AND is_active = TRUE
        LIMIT 1
        "#,
    )
    .bind(organization_id)
    .fetch_optional(pool)
    .await?;

    Ok(default_prompt
        .map(ResolvedPrompt::from)
        .unwrap_or_else(ResolvedPrompt::fallback))
}

/// Generate page content for a company.
///
/// # Errors
///
/// - `InvalidRequest` on a blank company name
/// - `PromptNotFound` when an explicit prompt id doesn't resolve
/// - `ServerConfiguration` when no model API key is configured
/// - `Generation` when the model call fails (the generation row is marked
///   failed first)
pub async fn generate_page_content(
    pool: &DbPool,
    config: &Config,
    organization_id: Uuid,
    request: GenerateContentRequest,
) -> Result<GenerateContentResponse, AppError> {
    if request.company_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "company_name is required".to_string(),
        ));
    }

    let api_key = config.anthropic_api_key.as_deref().ok_or_else(|| {
        AppError::ServerConfiguration(
            "ANTHROPIC_API_KEY is not set; content generation is disabled".to_string(),
        )
    })?;

    let prompt = resolve_prompt(pool, organization_id, &request).await?;
    let rendered = render_template(
        &prompt.user_prompt_template,
        &request.company_name,
        &request.context,
    );

    let input_text = format!(
        "Company: {}\nContext: {}",
        request.company_name, request.context
    );

    // Record the attempt before calling out, so abandoned calls are still
    // visible in usage review.
    let generation_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO ai_generations (
            organization_id, prompt_id, generation_type, input_text, input_length,
            prompt_used, model, temperature, max_tokens, status
        )
        VALUES ($1, $2, 'page_content', $3, $4, $5, $6, $7, $8, 'processing')
        RETURNING id
        "#,
    )
    .bind(organization_id)
    .bind(prompt.id)
    .bind(&input_text)
    .bind(input_text.len() as i32)
    .bind(&rendered)
    .bind(&prompt.model)
    .bind(prompt.temperature)
    .bind(prompt.max_tokens)
    .fetch_one(pool)
    .await?;

    let started = Instant::now();
    let result = anthropic::complete(
        api_key,
        &prompt.model,
        prompt.system_prompt.as_deref(),
        &rendered,
        prompt.temperature,
        prompt.max_tokens,
    )
    .await;

    match result {
        Ok(completion) => {
            let processing_time_ms = started.elapsed().as_millis() as i32;
            let cost = estimate_cost(completion.prompt_tokens, completion.completion_tokens);

            sqlx::query(
                r#"
                UPDATE ai_generations
                SET status = 'completed',
                    output_text = $2,
                    output_length = $3,
                    tokens_used = $4,
                    prompt_tokens = $5,
                    completion_tokens = $6,
                    processing_time_ms = $7,
                    cost_usd = $8
                WHERE id = $1
                "#,
            )
            .bind(generation_id)
            .bind(&completion.text)
            .bind(completion.text.len() as i32)
            .bind(completion.total_tokens())
            .bind(completion.prompt_tokens)
            .bind(completion.completion_tokens)
            .bind(processing_time_ms)
            .bind(cost)
            .execute(pool)
            .await?;

            Ok(GenerateContentResponse {
                generation_id,
                content: completion.text,
                tokens_used: completion.prompt_tokens + completion.completion_tokens,
            })
        }
        Err(err) => {
            // Best-effort failure record; the original error is what the
            // caller needs to see.
            let update = sqlx::query(
                "UPDATE ai_generations SET status = 'failed', error_message = $2 WHERE id = $1",
            )
            .bind(generation_id)
            .bind(err.to_string())
            .execute(pool)
            .await;
            if let Err(update_err) = update {
                tracing::warn!(%generation_id, error = %update_err, "failed to mark generation as failed");
            }

            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_variables() {
        let rendered = render_template(
            "Page for {{company_name}}: {{context}} / {{transcript}}",
            "Acme",
            "They sell anvils",
        );
        assert_eq!(rendered, "Page for Acme: They sell anvils / They sell anvils");
    }

    #[test]
    fn test_render_empty_context_uses_placeholders() {
        let rendered = render_template("{{context}} | {{transcript}}", "Acme", "  ");
        assert_eq!(
            rendered,
            "No additional context provided | No transcript provided"
        );
    }

    #[test]
    fn test_render_repeated_variable() {
        let rendered = render_template("{{company_name}} {{company_name}}", "Acme", "");
        assert_eq!(rendered, "Acme Acme");
    }

    #[test]
    fn test_cost_estimate() {
        // 1000 input tokens at $3/M-ish rates: (1000*0.003 + 2000*0.015)/1000
        let cost = estimate_cost(1000, 2000);
        assert!((cost - 0.033).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_prompt_shape() {
        let prompt = ResolvedPrompt::fallback();
        assert_eq!(prompt.id, None);
        assert_eq!(prompt.model, DEFAULT_MODEL);
        assert!(prompt.user_prompt_template.contains("{{company_name}}"));
    }
}
