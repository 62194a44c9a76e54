use crate::blocks::exhibit_block;
use crate::error::Result;
use actix_web::{web, HttpResponse};
use common::requests::{ExhibitRequest, ExhibitResponse};

pub async fn process(req: web::Json<ExhibitRequest>) -> Result<HttpResponse> {
    let req = req.into_inner();
    let block = exhibit_block(&req.parcels, req.with_image)?;
    Ok(HttpResponse::Ok().json(ExhibitResponse {
        exhibit_string: block.text,
        inline_image_token: block.inline_image_token,
        parcel_count: req.parcels.len(),
    }))
}
