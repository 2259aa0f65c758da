//! The `/api/generate` endpoint.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, post, web};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use uuid::Uuid;

use crate::deck::{TemplateInventory, build_deck, parse_plan_text};
use crate::llm::{Provider, build_plan_prompt};
use crate::server::AppState;
use crate::server::error::ApiError;

/// MIME type of the finished file (the whole package, not a part).
const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

struct GenerateForm {
    text: Option<String>,
    guidance: String,
    provider: String,
    api_key: Option<String>,
    template: Option<Bytes>,
}

/// Drain the multipart stream into the known fields, ignoring extras.
async fn read_form(
    payload: &mut Multipart,
    max_field_bytes: usize,
) -> Result<GenerateForm, ApiError> {
    let mut form = GenerateForm {
        text: None,
        guidance: String::new(),
        provider: "openrouter".to_string(),
        api_key: None,
        template: None,
    };

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let Some(name) = field.content_disposition().get_name().map(str::to_string) else {
            continue;
        };

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::BadRequest(e.to_string()))?;
            if data.len() + chunk.len() > max_field_bytes {
                return Err(ApiError::PayloadTooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "text" => form.text = Some(utf8_field("text", data)?),
            "guidance" => form.guidance = utf8_field("guidance", data)?,
            "provider" => form.provider = utf8_field("provider", data)?,
            "api_key" => form.api_key = Some(utf8_field("api_key", data)?),
            "template" => form.template = Some(data.freeze()),
            _ => {}
        }
    }

    Ok(form)
}

fn utf8_field(name: &'static str, data: BytesMut) -> Result<String, ApiError> {
    String::from_utf8(data.to_vec())
        .map_err(|_| ApiError::BadRequest(format!("field {name} is not valid UTF-8")))
}

/// Upload a template plus source text; download the generated deck.
#[post("/api/generate")]
pub async fn generate(
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let form = read_form(&mut payload, state.config.max_upload_bytes).await?;

    let text = form
        .text
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingField("text"))?;
    let api_key = form
        .api_key
        .filter(|k| !k.is_empty())
        .ok_or(ApiError::MissingField("api_key"))?;
    let template = form
        .template
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingField("template"))?;
    let provider = Provider::parse(&form.provider)?;

    tracing::info!(
        %request_id,
        %provider,
        template_bytes = template.len(),
        "generate request"
    );

    let inventory = TemplateInventory::extract(&template)?;
    let inventory_json =
        serde_json::to_string_pretty(&inventory).map_err(|e| ApiError::Internal(e.to_string()))?;
    let prompt = build_plan_prompt(&text, &form.guidance, provider, &inventory_json);

    let reply = state.llm.complete(provider, &api_key, &prompt).await?;
    tracing::debug!(%request_id, reply_bytes = reply.len(), "provider replied");
    let plan = parse_plan_text(&reply)?;

    // The build is pure CPU and file shuffling; keep it off the reactor.
    let deck = web::block(move || build_deck(&template, &plan))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::info!(%request_id, deck_bytes = deck.len(), "deck generated");
    Ok(HttpResponse::Ok()
        .content_type(PPTX_CONTENT_TYPE)
        .insert_header(("Content-Disposition", "attachment; filename=generated.pptx"))
        .body(deck))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::llm::{LlmClient, ProviderEndpoints};
    use crate::pptx::PptxPackage;
    use crate::pptx::fixture::two_layout_template;
    use actix_web::{App, test};

    const BOUNDARY: &str = "XBOUNDARY";

    fn multipart_body(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            if *name == "template" {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"deck.pptx\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            } else {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn request_with(parts: &[(&str, &[u8])]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/generate")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts))
    }

    fn state_with(llm: LlmClient, config: AppConfig) -> web::Data<AppState> {
        web::Data::new(AppState { config, llm })
    }

    #[actix_web::test]
    async fn test_missing_api_key_is_a_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(state_with(LlmClient::new(), AppConfig::default()))
                .service(generate),
        )
        .await;

        let template = two_layout_template();
        let req = request_with(&[("text", b"some prose"), ("template", &template)]).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "missing required field: api_key");
    }

    #[actix_web::test]
    async fn test_unknown_provider_maps_to_bad_gateway() {
        let app = test::init_service(
            App::new()
                .app_data(state_with(LlmClient::new(), AppConfig::default()))
                .service(generate),
        )
        .await;

        let template = two_layout_template();
        let req = request_with(&[
            ("text", b"some prose"),
            ("api_key", b"k"),
            ("provider", b"mistral"),
            ("template", &template),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 502);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "LLM provider error: unsupported provider: mistral");
    }

    #[actix_web::test]
    async fn test_oversized_template_is_rejected() {
        let config = AppConfig {
            max_upload_bytes: 64,
            ..AppConfig::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(state_with(LlmClient::new(), config))
                .service(generate),
        )
        .await;

        let template = two_layout_template();
        let req = request_with(&[("text", b"t"), ("api_key", b"k"), ("template", &template)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 413);
    }

    #[actix_web::test]
    async fn test_generate_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let plan = r#"{"slides":[{"title":"Built from a test","bullets":["one","two"]}],"metadata":{"total_slides":1}}"#;
        let mock = server
            .mock("POST", "/openrouter/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": plan}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let llm = LlmClient::new().with_endpoints(ProviderEndpoints {
            openrouter: format!("{}/openrouter/v1/chat/completions", server.url()),
            ..Default::default()
        });
        let app = test::init_service(
            App::new()
                .app_data(state_with(llm, AppConfig::default()))
                .service(generate),
        )
        .await;

        let template = two_layout_template();
        let req = request_with(&[
            ("text", b"quarterly update, two points"),
            ("guidance", b"short"),
            ("provider", b"openrouter"),
            ("api_key", b"or-key"),
            ("template", &template),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            PPTX_CONTENT_TYPE
        );
        assert_eq!(
            resp.headers().get("content-disposition").unwrap(),
            "attachment; filename=generated.pptx"
        );

        let deck = test::read_body(resp).await;
        let package = PptxPackage::from_bytes(&deck).unwrap();
        assert_eq!(package.slide_partnames().unwrap().len(), 1);
        mock.assert_async().await;
    }
}
