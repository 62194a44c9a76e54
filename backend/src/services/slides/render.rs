use crate::catalog::TemplateCatalog;
use crate::config::PPTX_MIME;
use crate::error::Result;
use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpResponse};
use common::requests::RenderSlideRequest;
use log::info;

pub async fn process(
    catalog: web::Data<TemplateCatalog>,
    path: web::Path<String>,
    req: web::Json<RenderSlideRequest>,
) -> Result<HttpResponse> {
    let template_id = path.into_inner();
    let mut deck = catalog.open(&template_id)?;
    deck.inject(&req.updates)?;
    info!(
        "rendered template '{}' with {} update(s)",
        template_id,
        req.updates.len()
    );

    Ok(HttpResponse::Ok()
        .content_type(PPTX_MIME)
        .insert_header(ContentDisposition::attachment(format!(
            "{}_rendered.pptx",
            template_id
        )))
        .body(deck.save()?))
}
