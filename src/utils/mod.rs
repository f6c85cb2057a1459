// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Small numeric helpers shared by the geometry and cut code

pub mod math;
