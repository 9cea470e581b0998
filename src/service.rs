use std::sync::Arc;

use geo::Point;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use saferoute_core::analysis::{CategoryFeatures, Metric, ProximityAnalyzer, SafetyMetrics};
use saferoute_core::error::RoutingError;
use saferoute_core::model::{FeatureCategory, FeatureSet, NodeIndex, StreetGraph};
use saferoute_core::routing::{DualPathRouter, Route, RoutePair, RouteVariant, SafetyScorer};
use saferoute_core::{Meters, StreetNodeId};

use crate::cancellation::{CancellationToken, RequestBudget};
use crate::config::ServiceConfig;
use crate::error::{Error, FeatureQueryError};
use crate::narrative::{NarrativeRequest, NarrativeResult, NarrativeScorer};
use crate::providers::{FeatureProvider, QueryEnvelope};
use crate::report::{RouteAnalysis, RouteFailure, RouteReport};

/// Start or end of a requested walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    /// OSM node id of the street network
    Node(StreetNodeId),
    /// Longitude/latitude, snapped to the nearest street node
    Location(Point<f64>),
}

impl From<StreetNodeId> for Endpoint {
    fn from(id: StreetNodeId) -> Self {
        Endpoint::Node(id)
    }
}

impl From<Point<f64>> for Endpoint {
    fn from(point: Point<f64>) -> Self {
        Endpoint::Location(point)
    }
}

/// Answers safe-route requests: dual-path routing, feature queries on a
/// bounded worker pool, proximity analysis and optional narrative scoring.
pub struct SafeRouteService {
    config: ServiceConfig,
    analyzer: ProximityAnalyzer,
    provider: Arc<dyn FeatureProvider>,
    narrator: Option<Arc<dyn NarrativeScorer>>,
    pool: ThreadPool,
}

impl SafeRouteService {
    /// # Errors
    ///
    /// Fails when the worker pool cannot be started.
    pub fn new(config: ServiceConfig, provider: Arc<dyn FeatureProvider>) -> Result<Self, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads.max(1))
            .thread_name(|i| format!("saferoute-worker-{i}"))
            .build()?;

        Ok(Self {
            analyzer: ProximityAnalyzer::from_config(&config.analysis),
            config,
            provider,
            narrator: None,
            pool,
        })
    }

    /// Enables narrative scoring. It only runs when the configuration has a
    /// `narrative` section.
    #[must_use]
    pub fn with_narrative_scorer(mut self, scorer: Arc<dyn NarrativeScorer>) -> Self {
        self.narrator = Some(scorer);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Routes between `origin` and `destination` and reports the safety
    /// metrics of both variants.
    ///
    /// Feature query failures, cancellation and the request deadline only
    /// make the affected metrics unavailable.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` or `NoSnapCandidate` when an endpoint cannot be
    /// placed on the network.
    pub fn analyze(
        &self,
        graph: &StreetGraph,
        origin: impl Into<Endpoint>,
        destination: impl Into<Endpoint>,
        token: &CancellationToken,
    ) -> Result<RouteAnalysis, Error> {
        let budget = RequestBudget::new(token.clone(), self.config.request_timeout());
        let pair = self.route(graph, origin.into(), destination.into())?;

        let failures: Vec<RouteFailure> = [RouteVariant::Shortest, RouteVariant::Safest]
            .into_iter()
            .filter_map(|variant| match pair.get(variant) {
                Ok(_) => None,
                Err(error) => {
                    log::warn!("No {variant} route: {error}");
                    Some(RouteFailure {
                        route_index: variant.route_index(),
                        variant,
                        error: error.clone(),
                    })
                }
            })
            .collect();

        let routes: Vec<Route> = pair.routes().cloned().collect();
        let features = self.query_features(&routes, &budget);

        let inputs: Vec<(&Route, &CategoryFeatures)> = routes.iter().zip(&features).collect();
        let metrics = self
            .pool
            .install(|| self.analyzer.analyze_all(&inputs));

        let narratives = self.narrate(&routes, &metrics, &budget);

        let reports = routes
            .into_iter()
            .zip(metrics)
            .zip(narratives)
            .map(|((route, metrics), narrative)| RouteReport::new(route, metrics, narrative))
            .collect();

        let cancelled = token.is_cancelled();
        if cancelled {
            log::info!("Request cancelled, returning partial results");
        }

        Ok(RouteAnalysis {
            routes: reports,
            failures,
            cancelled,
        })
    }

    fn route(
        &self,
        graph: &StreetGraph,
        origin: Endpoint,
        destination: Endpoint,
    ) -> Result<RoutePair, RoutingError> {
        let router = DualPathRouter::new(graph, SafetyScorer::new(self.config.analysis.scorer.clone()));

        let max_snap_distance = self.config.analysis.max_snap_distance;
        let resolve = |endpoint: Endpoint| -> Result<NodeIndex, RoutingError> {
            match endpoint {
                Endpoint::Node(id) => graph.node_index(id),
                Endpoint::Location(point) => graph.snap(&point, max_snap_distance),
            }
        };

        let start = resolve(origin)?;
        let target = resolve(destination)?;
        Ok(router.route_nodes(start, target))
    }

    /// Runs one query per route and category on the worker pool
    fn query_features(&self, routes: &[Route], budget: &RequestBudget) -> Vec<CategoryFeatures> {
        let margin = self.query_margin();
        let envelopes: Vec<Option<QueryEnvelope>> = routes
            .iter()
            .map(|route| QueryEnvelope::around(route.geometry(), self.analyzer.reprojector(), margin))
            .collect();

        let jobs: Vec<(usize, FeatureCategory)> = (0..routes.len())
            .flat_map(|i| FeatureCategory::ALL.into_iter().map(move |category| (i, category)))
            .collect();

        log::info!(
            "Querying {} feature layers for {} routes",
            FeatureCategory::ALL.len(),
            routes.len()
        );

        let results: Vec<(usize, FeatureCategory, Result<FeatureSet, FeatureQueryError>)> =
            self.pool.install(|| {
                jobs.par_iter()
                    .map(|&(i, category)| {
                        let result = match &envelopes[i] {
                            Some(envelope) => budget
                                .check()
                                .and_then(|()| self.provider.query(category, envelope, budget)),
                            None => Ok(FeatureSet::empty(category)),
                        };
                        (i, category, result)
                    })
                    .collect()
            });

        let mut features = vec![CategoryFeatures::new(); routes.len()];
        for (i, category, result) in results {
            match result {
                Ok(set) => {
                    log::debug!("Route {i}: {} {category} features", set.len());
                    features[i].insert(set);
                }
                Err(error) => {
                    log::warn!("Route {i}: {category} features unavailable: {error}");
                    features[i].mark_unavailable(category, error.to_string());
                }
            }
        }
        features
    }

    /// Widest proximity radius, so that envelopes include every feature a
    /// buffer test could hit
    fn query_margin(&self) -> Meters {
        let radii = &self.config.analysis.radii;
        FeatureCategory::ALL
            .into_iter()
            .filter_map(|category| radii.radius(category))
            .fold(0.0, f64::max)
    }

    fn narrate(
        &self,
        routes: &[Route],
        metrics: &[SafetyMetrics],
        budget: &RequestBudget,
    ) -> Vec<Option<Metric<NarrativeResult>>> {
        let (Some(narrator), Some(config)) = (&self.narrator, &self.config.narrative) else {
            return vec![None; routes.len()];
        };

        self.pool.install(|| {
            routes
                .par_iter()
                .zip(metrics)
                .map(|(route, metrics)| {
                    if let Err(error) = budget.check() {
                        return Some(Metric::unavailable(error.to_string()));
                    }
                    let request = NarrativeRequest {
                        route,
                        metrics,
                        config,
                    };
                    Some(match narrator.score(&request) {
                        Ok(result) => Metric::Available(result),
                        Err(error) => {
                            log::warn!("Route {}: {error}", route.route_index());
                            Metric::unavailable(error.to_string())
                        }
                    })
                })
                .collect()
        })
    }
}
