//! CreatePluginStep: crea el plugin personalizado y espera a que quede ACTIVE.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use msk_core::{PipelineStep, ResourceRef, StepContext, StepKind, StepRunResult, WaitSpec};
use serde_json::{json, Value};

use crate::ports::{ConnectControlPlane, PluginLocation};
use crate::readiness::poll_plugin;

pub const CREATE_PLUGIN: &str = "create-plugin";

pub struct CreatePluginStep {
    plane: Arc<dyn ConnectControlPlane>,
    name: String,
    location: PluginLocation,
    readiness: WaitSpec,
}

impl CreatePluginStep {
    pub fn new(plane: Arc<dyn ConnectControlPlane>, name: impl Into<String>, location: PluginLocation, readiness: WaitSpec) -> Self {
        Self { plane,
               name: name.into(),
               location,
               readiness }
    }

    async fn create_and_wait(&self, ctx: &StepContext) -> Result<ResourceRef, msk_core::CoreEngineError> {
        debug!("create_plugin:start name={}", self.name);
        let plugin = self.plane.create_plugin(&self.name, &self.location).await?;
        let outcome = poll_plugin(self.plane.as_ref(), &plugin, &self.readiness, ctx.cancellation()).await?;
        outcome.into_result()?;
        info!("create_plugin:done name={} plugin={}", self.name, plugin.id());
        Ok(plugin)
    }
}

#[async_trait]
impl PipelineStep for CreatePluginStep {
    fn name(&self) -> &str {
        CREATE_PLUGIN
    }

    fn kind(&self) -> StepKind {
        StepKind::Provision
    }

    fn describe(&self) -> Value {
        json!({
            "plugin_name": self.name,
            "location": self.location,
            "target_states": self.readiness.target_states,
            "max_wait_secs": self.readiness.max_wait.as_secs(),
        })
    }

    async fn execute(&self, ctx: &StepContext) -> StepRunResult {
        self.create_and_wait(ctx).await.into()
    }
}
