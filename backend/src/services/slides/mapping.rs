use crate::catalog::TemplateCatalog;
use crate::error::Result;
use actix_web::{web, HttpResponse};

pub async fn list(catalog: web::Data<TemplateCatalog>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(catalog.template_ids()?))
}

pub async fn process(
    catalog: web::Data<TemplateCatalog>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let descriptors = catalog.descriptors(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(descriptors))
}
