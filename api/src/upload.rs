use crate::error_response::ApiError;
use async_trait::async_trait;
use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};
use file_insights::{check_media_type, check_upload_size, QueryError, UploadedFile};

/// Multipart body of `POST /api/query`.
///
/// Extracting it is the upload gate: a `pdf` part that is not
/// `application/pdf`, or that grows past the size limit, is refused here
/// and the handler never runs. The file stays in memory.
#[derive(Debug, Default)]
pub struct QueryForm {
    pub question: Option<String>,
    pub file: Option<UploadedFile>,
}

#[async_trait]
impl<S> FromRequest<S> for QueryForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let mut form = QueryForm::default();

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let field_name = field.name().map(|n| n.to_string());
            match field_name.as_deref() {
                Some("pdf") => {
                    let media_type = field.content_type().map(|c| c.to_string());
                    if let Err(e) = check_media_type(media_type.as_deref()) {
                        log::debug!("Upload refused: declared type {:?}", media_type);
                        return Err(e.into());
                    }
                    let filename = field.file_name().map(|n| n.to_string());

                    let mut bytes = Vec::new();
                    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                        check_upload_size(bytes.len() + chunk.len())?;
                        bytes.extend_from_slice(&chunk);
                    }

                    if form.file.is_none() {
                        form.file = Some(UploadedFile {
                            filename,
                            bytes,
                        });
                    }
                }
                Some("question") => {
                    let text = field.text().await.map_err(multipart_error)?;
                    if form.question.is_none() {
                        form.question = Some(text);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        log::debug!("Upload refused: body exceeds limit");
        ApiError::Query(QueryError::FileTooLarge)
    } else {
        ApiError::BadRequest(format!("Multipart error: {}", err.body_text()))
    }
}
