//! Runtime domain operations for CDP page session.

use serde_json::{Value, json};

use crate::error::CdpError;
use crate::protocol::{ExceptionDetails, PropertyDescriptor, RemoteObject};

use super::core::PageSession;

impl PageSession {
    /// Evaluate JavaScript expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        Self::check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Evaluate JavaScript and return a remote object in `object_group`.
    pub async fn evaluate_handle(
        &self,
        expression: &str,
        object_group: &str,
    ) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": false,
                    "objectGroup": object_group,
                })),
            )
            .await?;

        Self::check_exception(&result)?;
        let remote_obj: RemoteObject = serde_json::from_value(result["result"].clone())?;
        Ok(remote_obj)
    }

    /// Call function on remote object and return its value.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Option<Vec<Value>>,
    ) -> Result<Value, CdpError> {
        let mut params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "returnByValue": true,
            "awaitPromise": true,
        });

        if let Some(a) = args {
            params["arguments"] = Self::call_arguments(a);
        }

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;

        Self::check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Call function on remote object and return the result as a remote object.
    pub async fn call_function_on_handle(
        &self,
        object_id: &str,
        function: &str,
        args: Option<Vec<Value>>,
        object_group: &str,
    ) -> Result<RemoteObject, CdpError> {
        let mut params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "returnByValue": false,
            "objectGroup": object_group,
        });

        if let Some(a) = args {
            params["arguments"] = Self::call_arguments(a);
        }

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;

        Self::check_exception(&result)?;
        let remote_obj: RemoteObject = serde_json::from_value(result["result"].clone())?;
        Ok(remote_obj)
    }

    /// Own properties of a remote object.
    pub async fn get_properties(&self, object_id: &str) -> Result<Vec<PropertyDescriptor>, CdpError> {
        let result = self
            .call(
                "Runtime.getProperties",
                Some(json!({
                    "objectId": object_id,
                    "ownProperties": true,
                })),
            )
            .await?;

        Self::check_exception(&result)?;
        let props: Vec<PropertyDescriptor> = serde_json::from_value(result["result"].clone())?;
        Ok(props)
    }

    /// Expose `window[name]` to the page; calls arrive as `Runtime.bindingCalled`.
    pub async fn add_binding(&self, name: &str) -> Result<(), CdpError> {
        self.call("Runtime.addBinding", Some(json!({"name": name})))
            .await?;
        Ok(())
    }

    pub async fn remove_binding(&self, name: &str) -> Result<(), CdpError> {
        self.call("Runtime.removeBinding", Some(json!({"name": name})))
            .await?;
        Ok(())
    }

    pub async fn release_object(&self, object_id: &str) -> Result<(), CdpError> {
        self.call("Runtime.releaseObject", Some(json!({"objectId": object_id})))
            .await?;
        Ok(())
    }

    /// Release every remote object handed out under `object_group`.
    pub async fn release_object_group(&self, object_group: &str) -> Result<(), CdpError> {
        self.call(
            "Runtime.releaseObjectGroup",
            Some(json!({"objectGroup": object_group})),
        )
        .await?;
        Ok(())
    }

    pub(super) fn call_arguments(args: Vec<Value>) -> Value {
        json!(args.into_iter().map(|v| json!({"value": v})).collect::<Vec<_>>())
    }

    pub(super) fn check_exception(result: &Value) -> Result<(), CdpError> {
        let Some(exception) = result.get("exceptionDetails") else {
            return Ok(());
        };
        let message = match serde_json::from_value::<ExceptionDetails>(exception.clone()) {
            Ok(details) => details.message(),
            Err(_) => exception["text"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        Err(CdpError::JavaScript(message))
    }
}
