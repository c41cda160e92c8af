use async_trait::async_trait;
use aws_sdk_s3::{
    error::ProvideErrorMetadata,
    primitives::{ByteStream, DateTime},
};
use time::OffsetDateTime;
use tracing::error;

use crate::{adapters, model, util};

fn to_offset_date_time(dt: Option<&DateTime>) -> Option<OffsetDateTime> {
    let dt = dt?;
    let secs = OffsetDateTime::from_unix_timestamp(dt.secs()).ok()?;

    secs.checked_add(time::Duration::nanoseconds(dt.subsec_nanos() as i64))
}

fn remote<E>(err: E) -> model::fs::FSError
where
    E: std::error::Error + Send + Sync + 'static,
{
    model::fs::FSError::Remote(Box::new(err))
}

#[async_trait]
impl adapters::Object for aws_sdk_s3::Client {
    async fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<(), model::fs::FSError> {
        let req = self
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));

        req.send().await.map_err(|err| {
            error!(error_message=%err, error_group="put_object", key=key);
            remote(err)
        })?;

        Ok(())
    }

    async fn fs_get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, model::fs::FSError> {
        let req = self.get_object().bucket(bucket).key(key);

        let o = match req.send().await {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_no_such_key() {
                        return Err(model::fs::FSError::NotFound(key.to_string()));
                    }
                }

                error!(error_message=%err, error_group="get_object", key=key);
                return Err(remote(err));
            }
            Ok(o) => o,
        };

        let bytes = o.body.collect().await.map_err(|err| {
            error!(error_message=%err, error_group="collect_body", key=key);
            remote(err)
        })?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<model::fs::FSObject>, model::fs::FSError> {
        let req = self.head_object().bucket(bucket).key(key);

        let ho = match req.send().await {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_not_found() {
                        return Ok(None);
                    }
                }

                error!(error_message=%err, error_group="head_object", key=key);
                return Err(remote(err));
            }
            Ok(ho) => ho,
        };

        Ok(Some(model::fs::FSObject {
            key: key.to_string(),
            size: ho.content_length().unwrap_or(0),
            modified_time: to_offset_date_time(ho.last_modified()),
            content_type: ho.content_type().map(|ct| ct.to_string()),
            etag: ho.e_tag().map(|tag| tag.to_string()),
        }))
    }

    async fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FSError> {
        let req = self.delete_object().bucket(bucket).key(key);

        req.send().await.map_err(|err| {
            error!(error_message=%err, error_group="delete_object", key=key);
            remote(err)
        })?;

        Ok(())
    }

    async fn fs_copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), model::fs::FSError> {
        let req = self
            .copy_object()
            .bucket(bucket)
            .copy_source(util::object::copy_source(bucket, source_key))
            .key(destination_key);

        if let Err(err) = req.send().await {
            // Copy has no modeled NoSuchKey variant, only the error code.
            if err.as_service_error().and_then(|svc_err| svc_err.code()) == Some("NoSuchKey") {
                return Err(model::fs::FSError::NotFound(source_key.to_string()));
            }

            error!(
                error_message=%err,
                error_group="copy_object",
                source_key=source_key,
                destination_key=destination_key
            );
            return Err(remote(err));
        }

        Ok(())
    }

    async fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
        max_keys: Option<i32>,
    ) -> Result<model::fs::FSObjectPage, model::fs::FSError> {
        let req = self
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation_token)
            .set_max_keys(max_keys);

        let lo = req.send().await.map_err(|err| {
            error!(error_message=%err, error_group="list_objects", prefix=prefix);
            remote(err)
        })?;

        let objects = lo
            .contents()
            .iter()
            .map(|o| model::fs::FSObject {
                key: o.key().unwrap_or("").to_string(),
                size: o.size().unwrap_or(0),
                modified_time: to_offset_date_time(o.last_modified()),
                content_type: None,
                etag: o.e_tag().map(|tag| tag.to_string()),
            })
            .collect();

        Ok(model::fs::FSObjectPage {
            objects,
            next_continuation_token: lo.next_continuation_token().map(|tok| tok.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_offset_date_time() {
        let cases = vec![
            (DateTime::from_secs(0), 0, 0),
            (DateTime::from_secs_and_nanos(1_700_000_000, 500), 1_700_000_000, 500),
        ];

        for (input, secs, nanos) in cases {
            let result = to_offset_date_time(Some(&input)).unwrap();
            assert_eq!(result.unix_timestamp(), secs, "failed for case: {:?}", input);
            assert_eq!(result.nanosecond(), nanos, "failed for case: {:?}", input);
        }

        assert_eq!(to_offset_date_time(None), None);
        assert_eq!(to_offset_date_time(Some(&DateTime::from_secs(i64::MAX))), None);
    }
}
