//! Simulation of a circuit and truth tables

mod simple_sim;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use fxhash::FxHashMap;
use log::info;

use crate::circuit::{Circuit, CircuitError};

pub use simple_sim::SimpleSimulator;

/// Input word for the given bit position, for a batch of 64 rows starting at `base`
fn input_word(base: u64, position: usize) -> u64 {
    const PATTERNS: [u64; 6] = [
        0xAAAA_AAAA_AAAA_AAAA,
        0xCCCC_CCCC_CCCC_CCCC,
        0xF0F0_F0F0_F0F0_F0F0,
        0xFF00_FF00_FF00_FF00,
        0xFFFF_0000_FFFF_0000,
        0xFFFF_FFFF_0000_0000,
    ];
    if position < 6 {
        PATTERNS[position]
    } else if (base >> position) & 1 != 0 {
        !0
    } else {
        0
    }
}

/// Simulate a circuit for a single input combination; return the output values
pub fn simulate(circuit: &Circuit, input_values: &[bool]) -> Result<Vec<bool>, CircuitError> {
    if input_values.len() != circuit.nb_inputs() {
        return Err(CircuitError::WrongInputCount {
            expected: circuit.nb_inputs(),
            actual: input_values.len(),
        });
    }
    let mut sim = SimpleSimulator::from_circuit(circuit)?;
    let words: Vec<u64> = input_values.iter().map(|b| if *b { !0 } else { 0 }).collect();
    Ok(sim.run(&words).iter().map(|w| w & 1 != 0).collect())
}

/// Complete input to output mapping of a circuit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    rows: Vec<(Vec<bool>, Vec<bool>)>,
    dictionary: FxHashMap<Vec<bool>, Vec<bool>>,
}

impl TableData {
    /// Rows in enumeration order
    pub fn rows(&self) -> &[(Vec<bool>, Vec<bool>)] {
        &self.rows
    }

    /// Output values for every input combination
    pub fn dictionary(&self) -> &FxHashMap<Vec<bool>, Vec<bool>> {
        &self.dictionary
    }

    /// Number of rows
    pub fn nb_rows(&self) -> usize {
        self.rows.len()
    }

    fn push(&mut self, input: Vec<bool>, output: Vec<bool>) {
        self.dictionary.insert(input.clone(), output.clone());
        self.rows.push((input, output));
    }
}

/// Truth table of a circuit, computed once on first access
///
/// Row `i` drives the first input with the most significant bit of `i`. A circuit
/// without inputs has an empty table. The table may be requested from several
/// threads: the first request computes it, and the others wait for the result.
#[derive(Debug)]
pub struct TruthTable {
    circuit: Circuit,
    table: OnceLock<Result<TableData, CircuitError>>,
    nb_computations: AtomicUsize,
}

impl TruthTable {
    /// Create the table of a circuit, without computing it
    pub fn new(circuit: Circuit) -> TruthTable {
        TruthTable {
            circuit,
            table: OnceLock::new(),
            nb_computations: AtomicUsize::new(0),
        }
    }

    /// Circuit being tabulated
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Get the table, computing it if needed
    pub fn table(&self) -> Result<&TableData, CircuitError> {
        self.table
            .get_or_init(|| self.compute())
            .as_ref()
            .map_err(|e| e.clone())
    }

    /// Output values for every input combination
    pub fn truth_table_dictionary(&self) -> Result<&FxHashMap<Vec<bool>, Vec<bool>>, CircuitError> {
        Ok(self.table()?.dictionary())
    }

    /// Rows in enumeration order
    pub fn rows(&self) -> Result<&[(Vec<bool>, Vec<bool>)], CircuitError> {
        Ok(self.table()?.rows())
    }

    /// Returns whether the table has been computed already
    pub fn is_computed(&self) -> bool {
        self.table.get().is_some()
    }

    /// Number of times the table was computed
    pub fn nb_computations(&self) -> usize {
        self.nb_computations.load(Ordering::SeqCst)
    }

    fn compute(&self) -> Result<TableData, CircuitError> {
        self.nb_computations.fetch_add(1, Ordering::SeqCst);
        let nb_inputs = self.circuit.nb_inputs();
        let mut ret = TableData::default();
        if nb_inputs == 0 {
            return Ok(ret);
        }
        if nb_inputs >= 64 {
            return Err(CircuitError::TooManyInputs(nb_inputs));
        }
        info!("Computing the truth table over {nb_inputs} inputs");
        let mut sim = SimpleSimulator::from_circuit(&self.circuit)?;
        let nb_rows = 1u64 << nb_inputs;
        let mut base = 0u64;
        while base < nb_rows {
            let words: Vec<u64> = (0..nb_inputs)
                .map(|j| input_word(base, nb_inputs - 1 - j))
                .collect();
            let outputs = sim.run(&words);
            for k in 0..(nb_rows - base).min(64) {
                let row = base + k;
                let input = (0..nb_inputs)
                    .map(|j| (row >> (nb_inputs - 1 - j)) & 1 != 0)
                    .collect();
                let output = outputs.iter().map(|w| (w >> k) & 1 != 0).collect();
                ret.push(input, output);
            }
            base += 64;
        }
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Driver, GateKind};
    use crate::connect::{ConnectivityEngine, ProximityDomain};
    use crate::sketch::generators::testcases;

    fn and_circuit() -> Circuit {
        let mut circuit = Circuit::new();
        let a = circuit.add_input("A");
        let b = circuit.add_input("B");
        let g = circuit.add_gate(GateKind::And);
        let y = circuit.add_output("Y");
        let ma = circuit.add_mesh(None);
        let mb = circuit.add_mesh(None);
        let my = circuit.add_mesh(None);
        circuit.connect_source(ma, Driver::new(a)).unwrap();
        circuit.connect_source(mb, Driver::new(b)).unwrap();
        circuit.connect_source(my, Driver::new(g)).unwrap();
        circuit.connect_dependent(ma, g, 0).unwrap();
        circuit.connect_dependent(mb, g, 1).unwrap();
        circuit.connect_dependent(my, y, 0).unwrap();
        circuit
    }

    #[test]
    fn test_and_table() {
        let table = TruthTable::new(and_circuit());
        assert!(!table.is_computed());
        for _ in 0..10 {
            let dict = table.truth_table_dictionary().unwrap();
            assert_eq!(dict.len(), 4);
            assert_eq!(dict[&vec![false, false]], vec![false]);
            assert_eq!(dict[&vec![false, true]], vec![false]);
            assert_eq!(dict[&vec![true, false]], vec![false]);
            assert_eq!(dict[&vec![true, true]], vec![true]);
        }
        assert_eq!(table.nb_computations(), 1);
        let rows = table.rows().unwrap();
        assert_eq!(rows[1], (vec![false, true], vec![false]));
        assert_eq!(rows[3], (vec![true, true], vec![true]));
    }

    #[test]
    fn test_concurrent_readers() {
        let table = TruthTable::new(and_circuit());
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| table.table().unwrap() as *const TableData as usize))
                .collect();
            let results: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert!(results.iter().all(|r| *r == results[0]));
        });
        assert_eq!(table.nb_computations(), 1);
        assert_eq!(table.table().unwrap().nb_rows(), 4);
    }

    #[test]
    fn test_no_input() {
        let table = TruthTable::new(Circuit::new());
        assert!(table.rows().unwrap().is_empty());
        assert!(table.truth_table_dictionary().unwrap().is_empty());
    }

    #[test]
    fn test_errors_are_cached() {
        let mut circuit = Circuit::new();
        circuit.add_input("A");
        circuit.add_output("Y");
        let table = TruthTable::new(circuit);
        for _ in 0..3 {
            assert!(matches!(
                table.table(),
                Err(CircuitError::UnconnectedInput { .. })
            ));
        }
        assert_eq!(table.nb_computations(), 1);
    }

    #[test]
    fn test_big_table() {
        // Seven inputs span two simulation batches
        let mut circuit = Circuit::new();
        let x = circuit.add_gate(GateKind::Xor);
        let y = circuit.add_output("parity");
        let my = circuit.add_mesh(None);
        circuit.connect_source(my, Driver::new(x)).unwrap();
        circuit.connect_dependent(my, y, 0).unwrap();
        for i in 0..7 {
            let a = circuit.add_input(&format!("i{i}"));
            let m = circuit.add_mesh(None);
            circuit.connect_source(m, Driver::new(a)).unwrap();
            circuit.connect_dependent(m, x, i).unwrap();
        }
        let table = TruthTable::new(circuit);
        let rows = table.rows().unwrap();
        assert_eq!(rows.len(), 128);
        for (i, (input, output)) in rows.iter().enumerate() {
            assert_eq!(input[6], i & 1 != 0);
            assert_eq!(input[0], i & 64 != 0);
            assert_eq!(output[0], i.count_ones() % 2 == 1);
        }
    }

    #[test]
    fn test_from_sketch() {
        let domain = ProximityDomain::new(testcases::RADIUS);
        let engine = ConnectivityEngine::new(&domain);

        let mut sketch = testcases::inverter();
        engine.connect_all(&mut sketch);
        let circuit = Circuit::from_sketch(&sketch).unwrap();
        assert_eq!(simulate(&circuit, &[false]).unwrap(), vec![true]);
        assert_eq!(simulate(&circuit, &[true]).unwrap(), vec![false]);
        assert_eq!(
            simulate(&circuit, &[true, false]),
            Err(CircuitError::WrongInputCount {
                expected: 1,
                actual: 2
            })
        );
        assert!(simulate(&circuit, &[]).is_err());

        let mut sketch = testcases::two_input_gate(crate::ShapeType::NOR);
        engine.connect_all(&mut sketch);
        let table = TruthTable::new(Circuit::from_sketch(&sketch).unwrap());
        let outputs: Vec<bool> = table.rows().unwrap().iter().map(|r| r.1[0]).collect();
        assert_eq!(outputs, vec![true, false, false, false]);
    }

    #[test]
    fn test_gate_chain_table() {
        let domain = ProximityDomain::new(testcases::RADIUS);
        let mut sketch = testcases::nand_not_chain();
        ConnectivityEngine::new(&domain).connect_all(&mut sketch);
        let table = TruthTable::new(Circuit::from_sketch(&sketch).unwrap());
        // Not(Nand(A, B)) is And(A, B)
        let outputs: Vec<bool> = table.rows().unwrap().iter().map(|r| r.1[0]).collect();
        assert_eq!(outputs, vec![false, false, false, true]);
    }

    #[test]
    fn test_fan_out_table() {
        let domain = ProximityDomain::new(testcases::RADIUS);
        let mut sketch = testcases::fan_out();
        ConnectivityEngine::new(&domain).connect_all(&mut sketch);
        let table = TruthTable::new(Circuit::from_sketch(&sketch).unwrap());
        assert_eq!(
            table.rows().unwrap(),
            &[
                (vec![false], vec![true, true]),
                (vec![true], vec![false, false])
            ]
        );
    }
}
