use crate::blocks::combined_block;
use crate::error::Result;
use actix_web::{web, HttpResponse};
use common::requests::{CombinedBlockRequest, CombinedBlockResponse};

pub async fn process(req: web::Json<CombinedBlockRequest>) -> Result<HttpResponse> {
    let req = req.into_inner();
    let block = combined_block(
        req.owner_type,
        req.num_signatures,
        req.include_signature,
        req.include_notary,
        req.embed_notary_in_signature,
        &req.fields,
        &req.notary_fields,
    )?;
    Ok(HttpResponse::Ok().json(CombinedBlockResponse {
        signature_block: block.signature,
        notary_block: block.notary,
        combined_block: block.combined,
    }))
}
