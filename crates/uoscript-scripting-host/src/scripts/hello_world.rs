use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::{Script, ScriptApi, ScriptLoadError, ScriptResult};

/// Example script that greets once the player is known
#[derive(Default)]
pub struct HelloWorldScript;

impl Script for HelloWorldScript {
    fn id(&self) -> &'static str {
        "hello_world"
    }

    fn name(&self) -> &'static str {
        "Hello World"
    }

    fn description(&self) -> &'static str {
        "Says hello one second after starting"
    }

    fn start(
        &self,
        api: ScriptApi,
    ) -> Result<LocalBoxFuture<'static, ScriptResult>, ScriptLoadError> {
        Ok(async move {
            api.log("HelloWorldScript loaded and ready!");
            api.sleep(1_000).await;

            if !api.player().say("Hello, world!", None) {
                api.client().sys_msg("Hello, world! (no player yet)", None);
            }
            api.exit()
        }
        .boxed_local())
    }
}
