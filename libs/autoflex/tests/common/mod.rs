#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use autoflex::{Attr, Record, Set};

// API side: plain Rust values, `Option` where the service may omit a field.

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct ClusterApi {
    pub name: Option<String>,
    pub node_count: Option<i32>,
    pub port: i32,
    pub enabled: bool,
    pub zones: Vec<String>,
    pub security_groups: Vec<String>,
    pub labels: HashMap<String, String>,
    pub endpoint: Option<EndpointApi>,
    pub rules: Vec<RuleApi>,
    pub tags: HashMap<String, String>,
    pub arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct EndpointApi {
    pub address: Option<String>,
    pub port: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct RuleApi {
    pub protocol: Option<String>,
    pub from_port: i32,
    pub to_port: i32,
}

// Config side: every field tri-state, integers at 64 bits.

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct ClusterModel {
    pub name: Attr<String>,
    #[flex(narrowing)]
    pub node_count: Attr<i64>,
    #[flex(narrowing)]
    pub port: Attr<i64>,
    pub enabled: Attr<bool>,
    pub zones: Attr<Vec<String>>,
    pub security_groups: Attr<Set<String>>,
    pub labels: Attr<BTreeMap<String, String>>,
    pub endpoint: Attr<EndpointModel>,
    pub rules: Attr<Vec<RuleModel>>,
    pub tags: Attr<BTreeMap<String, String>>,
    pub id: Attr<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct EndpointModel {
    pub address: Attr<String>,
    #[flex(narrowing)]
    pub port: Attr<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct RuleModel {
    pub protocol: Attr<String>,
    #[flex(narrowing)]
    pub from_port: Attr<i64>,
    #[flex(narrowing)]
    pub to_port: Attr<i64>,
}

pub fn rule(protocol: &str, from_port: i64, to_port: i64) -> RuleModel {
    RuleModel {
        protocol: protocol.into(),
        from_port: Attr::known(from_port),
        to_port: Attr::known(to_port),
    }
}

pub fn sample_model() -> ClusterModel {
    ClusterModel {
        name: "primary".into(),
        node_count: Attr::known(3),
        port: Attr::known(5432),
        enabled: Attr::known(true),
        zones: Attr::known(vec!["eu-west-1a".to_string(), "eu-west-1b".to_string()]),
        security_groups: Attr::known(["sg-1".to_string()].into_iter().collect()),
        labels: Attr::known(BTreeMap::from([("env".to_string(), "prod".to_string())])),
        endpoint: Attr::known(EndpointModel {
            address: "db.internal".into(),
            port: Attr::known(5432),
        }),
        rules: Attr::known(vec![rule("tcp", 5432, 5432), rule("udp", 53, 53)]),
        tags: Attr::known(BTreeMap::from([("team".to_string(), "core".to_string())])),
        id: "cluster-1".into(),
    }
}

pub fn sample_api() -> ClusterApi {
    ClusterApi {
        name: Some("primary".into()),
        node_count: Some(3),
        port: 5432,
        enabled: true,
        zones: vec!["eu-west-1a".into(), "eu-west-1b".into()],
        security_groups: vec!["sg-1".into(), "sg-2".into(), "sg-1".into()],
        labels: HashMap::from([("env".to_string(), "prod".to_string())]),
        endpoint: Some(EndpointApi {
            address: Some("db.internal".into()),
            port: Some(5432),
        }),
        rules: vec![
            RuleApi {
                protocol: Some("tcp".into()),
                from_port: 5432,
                to_port: 5432,
            },
            RuleApi {
                protocol: None,
                from_port: 0,
                to_port: 65535,
            },
        ],
        tags: HashMap::from([("team".to_string(), "core".to_string())]),
        arn: Some("arn:cluster/primary".into()),
    }
}
