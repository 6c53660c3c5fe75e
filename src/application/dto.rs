//! Wire schema for quote requests and responses.
//!
//! Amounts travel as decimal strings so `u128` values survive JSON readers
//! that only know doubles.

use serde::{Deserialize, Serialize};

use crate::domain::dex::DexType;
use crate::domain::routing::{QuoteRequest, QuoteResult, Route, RouteStep, DEFAULT_MAX_HOPS, DEFAULT_SLIPPAGE_BP};
use crate::shared::errors::ValidationError;
use crate::shared::types::{amount_string, CoinId};

fn default_slippage() -> u32 {
    DEFAULT_SLIPPAGE_BP
}

fn default_max_hops() -> u8 {
    DEFAULT_MAX_HOPS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequestBody {
    pub coin_in: String,
    pub coin_out: String,
    pub amount_in: String,
    #[serde(default = "default_slippage")]
    pub slippage_tolerance_bp: u32,
    #[serde(default)]
    pub exclude_dexes: Vec<String>,
    #[serde(default = "default_max_hops")]
    pub max_hops: u8,
}

impl QuoteRequestBody {
    /// Parse and validate into a domain request
    pub fn into_request(self) -> Result<QuoteRequest, ValidationError> {
        let amount_in = self
            .amount_in
            .trim()
            .parse::<u128>()
            .map_err(|_| ValidationError::InvalidAmount(self.amount_in.clone()))?;
        let exclude_dexes = self
            .exclude_dexes
            .iter()
            .map(|tag| tag.parse::<DexType>())
            .collect::<Result<Vec<_>, _>>()?;

        let request = QuoteRequest::new(CoinId::new(self.coin_in), CoinId::new(self.coin_out), amount_in)
            .with_slippage(self.slippage_tolerance_bp)
            .with_max_hops(self.max_hops)
            .excluding(exclude_dexes);
        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStepBody {
    pub dex_type: DexType,
    pub coin_in: CoinId,
    pub coin_out: CoinId,
    pub pool_address: String,
    #[serde(with = "amount_string")]
    pub amount_in: u128,
    #[serde(with = "amount_string")]
    pub amount_out: u128,
    pub fee_rate: u32,
    pub price_impact: u32,
}

impl From<&RouteStep> for RouteStepBody {
    fn from(step: &RouteStep) -> Self {
        Self {
            dex_type: step.dex_type,
            coin_in: step.coin_in.clone(),
            coin_out: step.coin_out.clone(),
            pool_address: step.pool_address.clone(),
            amount_in: step.amount_in,
            amount_out: step.amount_out,
            fee_rate: step.fee_rate,
            price_impact: step.price_impact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteBody {
    pub steps: Vec<RouteStepBody>,
    #[serde(with = "amount_string")]
    pub amount_in: u128,
    #[serde(with = "amount_string")]
    pub amount_out: u128,
    pub price_impact: u32,
    #[serde(with = "amount_string")]
    pub fee: u128,
    pub estimated_gas: u64,
}

impl From<&Route> for RouteBody {
    fn from(route: &Route) -> Self {
        Self {
            steps: route.steps.iter().map(RouteStepBody::from).collect(),
            amount_in: route.amount_in,
            amount_out: route.amount_out,
            price_impact: route.price_impact,
            fee: route.fee,
            estimated_gas: route.estimated_gas,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponseBody {
    /// `null` when no route exists
    pub route: Option<RouteBody>,
    pub routes: Vec<RouteBody>,
    pub minimum_amount_out: Option<String>,
}

impl QuoteResponseBody {
    pub fn is_no_route(&self) -> bool {
        self.route.is_none()
    }

    /// 200 with a route, 404 without
    pub fn status_code(&self) -> u16 {
        if self.is_no_route() {
            404
        } else {
            200
        }
    }
}

impl From<&QuoteResult> for QuoteResponseBody {
    fn from(result: &QuoteResult) -> Self {
        match result {
            QuoteResult::NoRoute => Self {
                route: None,
                routes: Vec::new(),
                minimum_amount_out: None,
            },
            QuoteResult::Found(quote) => Self {
                route: Some(RouteBody::from(&quote.best)),
                routes: quote.alternatives.iter().map(RouteBody::from).collect(),
                minimum_amount_out: Some(quote.minimum_amount_out.to_string()),
            },
        }
    }
}
