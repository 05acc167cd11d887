use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt, TryStreamExt};

use super::model::{self, Attachment, Auth, Document, Method};
use super::transport::{Exchange, Transport};
use crate::params::Normalized;
use crate::{Error, Result};

struct Step {
    params: Normalized,
    attachment: Option<Attachment>,
}

/// Lazy sequence of documents produced by following `continue` fields.
///
/// Requests are issued one at a time as the stream is polled. The first
/// error ends the stream. Dropping it stops further requests.
pub struct Continuation<'a> {
    inner: BoxStream<'a, Result<Document>>,
}

impl<'a> Continuation<'a> {
    pub(crate) fn new(
        transport: &'a Transport,
        method: Method,
        mut params: Normalized,
        attachment: Option<Attachment>,
        auth: Option<Auth>,
        timeout: Option<Duration>,
    ) -> Continuation<'a> {
        // opt into the current continuation protocol
        if !params.contains_key("continue") {
            params.insert("continue", "");
        }

        let first = Step { params, attachment };
        let inner = stream::try_unfold(Some(first), move |step| {
            let auth = auth.clone();
            async move {
                let Some(Step {
                    mut params,
                    attachment,
                }) = step
                else {
                    return Ok::<_, Error>(None);
                };

                let doc = transport
                    .send(Exchange {
                        method,
                        params: &params,
                        attachment,
                        auth: auth.as_ref(),
                        timeout,
                    })
                    .await?;

                let next = match model::continue_token(&doc) {
                    Some(token) => {
                        params.merge_continue(token);
                        // the file was already uploaded
                        Some(Step {
                            params,
                            attachment: None,
                        })
                    }
                    None => None,
                };

                Ok::<_, Error>(Some((doc, next)))
            }
        });

        Continuation {
            inner: inner.boxed(),
        }
    }

    /// Drive the whole sequence and keep every document.
    pub async fn collect_all(self) -> Result<Vec<Document>> {
        self.try_collect().await
    }
}

impl Stream for Continuation<'_> {
    type Item = Result<Document>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}
