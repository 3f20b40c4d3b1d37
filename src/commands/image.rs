use super::AppState;
use crate::api::{OcrLanguage, OcrRequest, OcrResult};
use std::path::Path;

pub async fn ocr_translate(
    state: &AppState,
    image_path: Option<&Path>,
    source_lang: OcrLanguage,
    target_lang: OcrLanguage,
) -> Result<OcrResult, String> {
    let path = image_path.ok_or("Please select an image first.")?;
    let image = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to pick image: {}", e))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image.jpg")
        .to_string();

    let request = OcrRequest {
        image,
        file_name,
        source_lang,
        target_lang,
    };
    state.backend.ocr_translate(&request).await.map_err(|e| {
        tracing::warn!("ocr_translate failed: {}", e);
        match e.server_message() {
            Some(message) => format!("Failed to process image: {}", message),
            None => format!("Failed to process image: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeBackend};
    use crate::commands::test_support::state_with;

    #[tokio::test]
    async fn test_requires_an_image() {
        let (state, backend) = state_with(FakeBackend::default());
        let err = ocr_translate(&state, None, OcrLanguage::English, OcrLanguage::Spanish)
            .await
            .unwrap_err();
        assert_eq!(err, "Please select an image first.");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sends_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sign.png");
        std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();
        let (state, backend) = state_with(FakeBackend::default());

        let result = ocr_translate(&state, Some(&path), OcrLanguage::English, OcrLanguage::Spanish)
            .await
            .unwrap();
        assert_eq!(result.translated_text, "hola");
        assert_eq!(backend.calls(), vec![Call::Ocr(4)]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_alert() {
        let (state, _) = state_with(FakeBackend::default());
        let err = ocr_translate(
            &state,
            Some(Path::new("/definitely/not/here.jpg")),
            OcrLanguage::French,
            OcrLanguage::English,
        )
        .await
        .unwrap_err();
        assert!(err.starts_with("Failed to pick image"));
    }
}
