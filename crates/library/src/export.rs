use crate::error::{ErrorKind, Result};
use crate::{Context, ExportRequest, aggregate};
use exn::ResultExt;
use sge_export::{ExportJob, Format, render};
use tracing::instrument;

/// A rendered export, ready to be delivered.
#[derive(Debug)]
pub struct Exported {
    pub file_name: String,
    pub mime_type: &'static str,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

/// Aggregate the request's rows and render them in `format`.
#[instrument(skip(ctx), fields(account = %request.account))]
pub async fn export(ctx: &Context, request: &ExportRequest, format: Format) -> Result<Exported> {
    let rows = aggregate(ctx, request).await?;
    let job = ExportJob {
        account: request.account,
        rows,
        format,
    };
    let bytes = render(&job).or_raise(|| ErrorKind::Export)?;
    Ok(Exported {
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        rows: job.rows.len(),
        bytes,
    })
}
