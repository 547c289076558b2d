//! 跳转解析热路径基准测试

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};

use shortgate::analytics::{ClickManager, ClickRecord, ClickSink};
use shortgate::services::geoip::{GeoInfo, GeoIpLookup, GeoIpProvider};
use shortgate::services::resolver::{RedirectStore, Resolver, Visit};
use shortgate::services::targeting::select_target;
use shortgate::services::user_agent::classify_user_agent;
use shortgate::services::GrantService;
use shortgate::storage::models::{Redirect, RuleMatcher, TargetingRule};

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

struct MapStore {
    records: HashMap<String, Redirect>,
}

#[async_trait]
impl RedirectStore for MapStore {
    async fn find_by_code(
        &self,
        code: &str,
    ) -> shortgate::errors::Result<Option<Redirect>> {
        Ok(self.records.get(code).cloned())
    }
}

struct NullSink;

#[async_trait]
impl ClickSink for NullSink {
    async fn log_clicks_batch(&self, _records: Vec<ClickRecord>) -> anyhow::Result<()> {
        Ok(())
    }
}

struct NoGeo;

#[async_trait]
impl GeoIpLookup for NoGeo {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "NoGeo"
    }
}

fn bench_record(code: &str) -> Redirect {
    Redirect {
        short_code: code.to_string(),
        target_url: Some("https://example.com".to_string()),
        description: None,
        active: true,
        owner_id: "user_1".to_string(),
        created_at: Utc::now(),
        starts_at: None,
        expires_at: None,
        password: None,
        og_title: None,
        og_description: None,
        og_image: None,
        rules: vec![
            TargetingRule {
                matcher: RuleMatcher::Device("mobile".to_string()),
                target_url: "https://m.example.com".to_string(),
            },
        ],
    }
}

fn build_resolver() -> Resolver {
    shortgate::config::init_config();

    let store = Arc::new(MapStore {
        records: HashMap::from([("bench".to_string(), bench_record("bench"))]),
    });
    let clicks = Arc::new(ClickManager::new(
        Arc::new(NullSink),
        std::time::Duration::from_secs(3600),
        usize::MAX,
    ));
    Resolver::new(
        store,
        clicks,
        Arc::new(GeoIpProvider::with_lookup(Arc::new(NoGeo))),
        Arc::new(GrantService::new("bench-secret", 24)),
    )
}

fn bench_classify_user_agent(c: &mut Criterion) {
    c.bench_function("resolver/classify_ua", |b| {
        b.iter(|| {
            let agent = classify_user_agent(DESKTOP_UA);
            assert!(!agent.is_bot);
        });
    });
}

fn bench_select_target(c: &mut Criterion) {
    let rules: Vec<TargetingRule> = (0..8)
        .map(|i| TargetingRule {
            matcher: RuleMatcher::Geo(format!("C{}", i)),
            target_url: format!("https://{}.example.com", i),
        })
        .collect();

    c.bench_function("resolver/select_target_miss", |b| {
        b.iter(|| {
            let target = select_target(&rules, "desktop", Some("US"));
            assert!(target.is_none());
        });
    });
}

fn bench_grant_verify(c: &mut Criterion) {
    let grants = GrantService::new("bench-secret", 24);
    let token = grants.issue("bench").unwrap();

    c.bench_function("resolver/grant_verify", |b| {
        b.iter(|| {
            assert!(grants.verify(&token, "bench"));
        });
    });
}

fn bench_full_resolve(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let resolver = build_resolver();

    c.bench_function("resolver/resolve_hit", |b| {
        b.to_async(&rt).iter(|| async {
            let visit = Visit {
                user_agent: Some(DESKTOP_UA.to_string()),
                ip: Some("203.0.113.10".to_string()),
                referrer: None,
                now: Utc::now(),
                grant: None,
            };
            let outcome = resolver.resolve("bench", visit).await;
            assert!(matches!(
                outcome,
                shortgate::services::resolver::Outcome::Redirect { .. }
            ));
        });
    });
}

criterion_group!(
    benches,
    bench_classify_user_agent,
    bench_select_target,
    bench_grant_verify,
    bench_full_resolve
);
criterion_main!(benches);
