//! Deployment runner
//!
//! Drives the whole flow: connect, deploy the Bank contract, then execute the
//! configured steps one after another. Any error stops the run.

use crate::config::{Config, RpcConfig};
use crate::contract::{self, artifact, await_receipt, BankContract, Deployment};
use crate::step::Step;
use crate::transcript::Transcript;
use crate::wallet::{Credentials, SigningContext};
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, RootProvider};
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Instant;
use tracing::{info, warn};

/// Result of one executed step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub result: Value,
}

/// Summary of a full run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub contract: Address,
    pub deployment: contract::SubmittedTransaction,
    pub outcomes: Vec<StepOutcome>,
}

/// Runner that owns the configuration, the endpoint and the credentials
pub struct Runner {
    config: Config,
    rpc: RpcConfig,
    credentials: Option<Credentials>,
    transcript: Transcript,
}

impl Runner {
    /// Create a new runner; reads work without credentials
    pub fn new(config: Config, rpc: RpcConfig) -> Self {
        let transcript = Transcript::from_config(config.transcript_path.as_deref());
        Self {
            config,
            rpc,
            credentials: None,
            transcript,
        }
    }

    /// Set the credentials used for deployment and writes
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connect(&self) -> RootProvider {
        self.rpc.connect()
    }

    /// Deploy, then run every configured step, printing each result
    pub async fn run(&self) -> Result<RunReport> {
        info!(
            rpc_url = %self.rpc.url(),
            steps = self.config.sequence.len(),
            run_id = %self.transcript.run_id(),
            "Starting run"
        );

        let bytecode = artifact::load_bytecode(&self.config.artifact_path)?;
        let provider = self.connect();

        let deployment = self.deploy(&provider, &bytecode).await?;
        println!("{}", deployment.address.to_checksum(None));
        println!("{}", serde_json::to_string(&deployment.transaction)?);

        let contract = deployment.contract;
        let mut outcomes = Vec::with_capacity(self.config.sequence.len());
        for step in &self.config.sequence {
            let result = self.execute_step(&contract, step).await?;
            println!("{}", serde_json::to_string(&result)?);
            outcomes.push(StepOutcome {
                step: step.clone(),
                result,
            });
        }

        info!(contract = %deployment.address, "Run complete");

        Ok(RunReport {
            contract: deployment.address,
            deployment: deployment.transaction,
            outcomes,
        })
    }

    /// Submit the creation transaction, waiting for it when configured
    pub async fn deploy<P: Provider + Clone>(
        &self,
        provider: &P,
        bytecode: &Bytes,
    ) -> Result<Deployment<P>> {
        let started = Instant::now();
        let outcome = self
            .bounded("deploy", async {
                let context = self.signing_context(provider).await?;
                let mut deployment = contract::deploy(context, provider, bytecode, &[]).await?;
                if self.config.wait_for_receipts {
                    await_receipt(provider, &mut deployment.transaction).await?;
                }
                Ok(deployment)
            })
            .await;

        match &outcome {
            Ok(deployment) => {
                let value = serde_json::to_value(&deployment.transaction)?;
                self.transcript.record("deploy", Ok(&value), elapsed_ms(started));
            }
            Err(e) => self.transcript.record("deploy", Err(e), elapsed_ms(started)),
        }
        outcome
    }

    /// Execute a single step against `contract` and return its JSON result
    pub async fn execute_step<P: Provider + Clone>(
        &self,
        contract: &BankContract<P>,
        step: &Step,
    ) -> Result<Value> {
        let label = step.to_string();
        let started = Instant::now();

        let outcome = self.bounded(&label, self.dispatch(contract, step)).await;

        match &outcome {
            Ok(value) => self.transcript.record(&label, Ok(value), elapsed_ms(started)),
            Err(e) => {
                warn!(step = %label, error = %e, "Step failed");
                self.transcript.record(&label, Err(e), elapsed_ms(started));
            }
        }
        outcome
    }

    async fn dispatch<P: Provider + Clone>(
        &self,
        contract: &BankContract<P>,
        step: &Step,
    ) -> Result<Value> {
        match step {
            Step::Admin => {
                let admin = contract::admin(contract).await?;
                Ok(json!(admin.to_checksum(None)))
            }
            Step::Balance => {
                let balance = contract::balance(contract).await?;
                Ok(json!(balance.to_string()))
            }
            Step::Deposit(amount) => {
                // A fresh context per write keeps nonces strictly increasing
                let context = self.signing_context(contract.provider()).await?;
                let mut tx = contract::deposit(contract, context, *amount).await?;
                self.confirm(contract.provider(), &mut tx).await?;
                Ok(serde_json::to_value(&tx)?)
            }
            Step::Withdraw(amount) => {
                let context = self.signing_context(contract.provider()).await?;
                let mut tx = contract::withdraw(contract, context, *amount).await?;
                self.confirm(contract.provider(), &mut tx).await?;
                Ok(serde_json::to_value(&tx)?)
            }
        }
    }

    async fn confirm<P: Provider>(
        &self,
        provider: &P,
        tx: &mut contract::SubmittedTransaction,
    ) -> Result<()> {
        if self.config.wait_for_receipts {
            await_receipt(provider, tx).await?;
        }
        Ok(())
    }

    /// Build a fresh signing context from the node's pending nonce
    pub async fn signing_context<P: Provider>(&self, provider: &P) -> Result<SigningContext> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            Error::Credential(format!(
                "No signing key loaded. Set {} to deploy or send transactions.",
                self.config.key_env
            ))
        })?;
        SigningContext::build(provider, credentials, self.config.gas).await
    }

    async fn bounded<T>(&self, what: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.config.request_timeout() {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                Error::Network(format!("{} timed out after {}s", what, limit.as_secs()))
            })?,
            None => fut.await,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
