use crate::blocks::{notary_block, signature_block};
use crate::error::Result;
use actix_web::{web, HttpResponse};
use common::requests::SignatureBlockRequest;

pub async fn process(req: web::Json<SignatureBlockRequest>) -> Result<HttpResponse> {
    let req = req.into_inner();
    let notary = req
        .with_notary
        .then(|| notary_block(req.owner_type, &req.notary_fields));
    let block = signature_block(
        req.owner_type,
        req.num_signatures,
        &req.fields,
        notary.as_deref(),
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({ "signature_block": block })))
}
