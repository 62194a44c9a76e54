use crate::blocks::notary_block;
use crate::error::Result;
use actix_web::{web, HttpResponse};
use common::requests::NotaryBlockRequest;

pub async fn process(req: web::Json<NotaryBlockRequest>) -> Result<HttpResponse> {
    let block = notary_block(req.owner_type, &req.fields);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "notary_block": block })))
}
