//! 配置校验模块
//!
//! 校验规则：
//! - chunk_size > 0
//! - sink name 非空且唯一
//! - 每种 sink 类型的必填参数齐全
//! - network sink 的 addr 可解析

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{ContractError, SinkType, TeeBlueprint};

/// 校验 TeeBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &TeeBlueprint) -> Result<(), ContractError> {
    validate_chunk_size(blueprint)?;
    validate_sink_names(blueprint)?;
    validate_sink_params(blueprint)?;
    Ok(())
}

/// 校验读取块大小
fn validate_chunk_size(blueprint: &TeeBlueprint) -> Result<(), ContractError> {
    if blueprint.chunk_size == 0 {
        return Err(ContractError::config_validation(
            "chunk_size",
            "chunk_size must be > 0",
        ));
    }
    Ok(())
}

/// 校验 sink 名称
fn validate_sink_names(blueprint: &TeeBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// 校验 sink 参数
fn validate_sink_params(blueprint: &TeeBlueprint) -> Result<(), ContractError> {
    for sink in &blueprint.sinks {
        for key in sink.sink_type.required_params() {
            let present = sink.params.get(*key).is_some_and(|v| !v.is_empty());
            if !present {
                return Err(ContractError::config_validation(
                    format!("sinks[{}].params.{}", sink.name, key),
                    format!("'{}' is required for {:?} sinks", key, sink.sink_type),
                ));
            }
        }

        if sink.sink_type == SinkType::Network {
            let addr = &sink.params["addr"];
            if addr.parse::<SocketAddr>().is_err() {
                return Err(ContractError::config_validation(
                    format!("sinks[{}].params.addr", sink.name),
                    format!("invalid socket address '{}'", addr),
                ));
            }
        }
    }
    Ok(())
}
