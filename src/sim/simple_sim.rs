use crate::circuit::{Circuit, CircuitError, Component, Driver, GateKind};

/// Bit-parallel simulator over a circuit, evaluating 64 input patterns at once
pub struct SimpleSimulator<'a> {
    circuit: &'a Circuit,
    order: Vec<usize>,
    values: Vec<u64>,
}

impl<'a> SimpleSimulator<'a> {
    /// Prepare the simulation; fails on undriven inputs and combinational loops
    pub fn from_circuit(circuit: &'a Circuit) -> Result<SimpleSimulator<'a>, CircuitError> {
        circuit.check()?;
        Ok(SimpleSimulator {
            circuit,
            order: topo_sort(circuit)?,
            values: vec![0; circuit.nb_components()],
        })
    }

    /// Run one batch: one word per primary input; return one word per primary output
    pub fn run(&mut self, input_values: &[u64]) -> Vec<u64> {
        assert_eq!(input_values.len(), self.circuit.nb_inputs());
        for (c, v) in self.circuit.inputs().iter().zip(input_values) {
            self.values[*c] = *v;
        }
        self.run_comb();
        self.get_output_values()
    }

    fn get_value(&self, d: &Option<Driver>) -> u64 {
        match d {
            Some(d) => self.values[d.component],
            None => panic!("Simulating an undriven input"),
        }
    }

    fn run_comb(&mut self) {
        for i in 0..self.order.len() {
            let c = self.order[i];
            let Component::Gate(g) = self.circuit.component(c) else {
                continue;
            };
            let inputs = self.circuit.component(c).inputs();
            let val = match g.kind {
                GateKind::And => self.compute_andn(inputs, false, false),
                GateKind::Or => self.compute_andn(inputs, true, true),
                GateKind::Nand => self.compute_andn(inputs, false, true),
                GateKind::Nor => self.compute_andn(inputs, true, false),
                GateKind::Xor => self.compute_xorn(inputs, false),
                GateKind::Xnor => self.compute_xorn(inputs, true),
                GateKind::Not => !self.get_value(&inputs[0]),
            };
            self.values[c] = val;
        }
    }

    fn compute_andn(&self, v: &[Option<Driver>], inv_in: bool, inv_out: bool) -> u64 {
        let mut ret = !0u64;
        for s in v {
            let x = self.get_value(s);
            ret &= if inv_in { !x } else { x };
        }
        if inv_out {
            !ret
        } else {
            ret
        }
    }

    fn compute_xorn(&self, v: &[Option<Driver>], inv_out: bool) -> u64 {
        let mut ret = 0u64;
        for s in v {
            ret ^= self.get_value(s);
        }
        if inv_out {
            !ret
        } else {
            ret
        }
    }

    fn get_output_values(&self) -> Vec<u64> {
        self.circuit
            .outputs()
            .iter()
            .map(|o| self.get_value(&self.circuit.component(*o).inputs()[0]))
            .collect()
    }
}

/// Order the gates so that every gate comes after its drivers
fn topo_sort(circuit: &Circuit) -> Result<Vec<usize>, CircuitError> {
    let n = circuit.nb_components();
    let is_gate = |c: usize| matches!(circuit.component(c), Component::Gate(_));

    // Count the gate dependencies of each gate, and record the reverse edges
    let mut count_deps = vec![0u32; n];
    let mut fanouts = vec![Vec::new(); n];
    for c in (0..n).filter(|c| is_gate(*c)) {
        for d in circuit.component(c).inputs().iter().flatten() {
            if is_gate(d.component) {
                count_deps[c] += 1;
                fanouts[d.component].push(c);
            }
        }
    }

    // Start with gates driven by primary inputs only
    let mut order = Vec::new();
    let mut to_visit: Vec<usize> = (0..n)
        .filter(|c| is_gate(*c) && count_deps[*c] == 0)
        .rev()
        .collect();
    while let Some(c) = to_visit.pop() {
        order.push(c);
        for f in &fanouts[c] {
            count_deps[*f] -= 1;
            if count_deps[*f] == 0 {
                to_visit.push(*f);
            }
        }
    }

    if order.len() != circuit.nb_gates() {
        return Err(CircuitError::CombinationalLoop);
    }
    Ok(order)
}
